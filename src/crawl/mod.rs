//! The link collection phase.
//!
//! Walks a date range over the archive, month by month on a bounded worker
//! pool, day by day within each month, page by page within each day:
//!
//! 1. [`scheduler::CrawlScheduler`] partitions the range into month tasks
//!    and dispatches them
//! 2. [`month`] runs one month: days ascending, early stop once a monthly
//!    summary signal appears, one bulk append to the link store at the end
//! 3. [`paginator`] pages through one day until the listing runs dry

pub mod month;
pub mod paginator;
pub mod scheduler;
