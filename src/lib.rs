pub mod error;
pub mod pagination;
pub mod auth;
pub mod models {
    pub mod story;
}
pub mod db {
    pub mod models;
    pub mod story_repository;
    pub mod comment_repository;
    #[cfg(test)]
    pub mod memory;
}
pub mod api {
    pub mod errors;
    pub mod stories;
}

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod state;
#[cfg(feature = "server")]
pub mod router;
