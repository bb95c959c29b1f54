pub mod dispatcher;
pub mod lang_cache;
pub mod permalink;
pub mod resolver;
pub mod sanitize;
pub mod stores;
pub mod translate;
