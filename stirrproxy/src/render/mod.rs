/*!
    Pure functions turning a snapshot into the documents served to clients.

    Nothing in here touches the cache; callers hand in the snapshot they
    read, so rendering never holds a lock.
*/

mod guide;
mod playlist;
mod status_page;

pub use guide::render_guide;
pub use playlist::render_playlist;
pub use status_page::render_status_page;
