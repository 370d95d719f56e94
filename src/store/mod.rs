//! Record store for DoNow
//!
//! Persists users, sessions, projects, tasks, timer actions and report
//! views in SQLite (`~/.donow/donow.db`). Each entity's queries live in
//! their own file as `impl Store` blocks.
//!
//! # Usage
//!
//! ```ignore
//! let store = Store::open(&config.storage.db_path())?;
//! let filter = ActionFilter::for_user(&user.id).completed().started_between(start, end);
//! let actions = store.resolve_actions(store.list_actions(&filter)?)?;
//! ```

mod actions;
mod db;
mod projects;
mod report_views;
mod tasks;
mod users;

pub use actions::ActionFilter;
pub use db::Store;
