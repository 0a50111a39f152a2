// Copyright (c) 2024 Mike Tsao

//! Build identification for end users.

/// The crate version, or a version-control identifier if the build script
/// environment provided one.
pub fn app_version() -> &'static str {
    option_env!("GIT_DESCRIBE")
        .or(option_env!("GIT_REV_PARSE"))
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}
