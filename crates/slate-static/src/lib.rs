//! Static site generator for slate blogs.
//!
//! Loads the post corpus and renders index, post and tag pages plus the site
//! and highlighting stylesheets.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{
    BuildConfig, BuildError, BuildResult, HighlightConfig, SiteMeta, SocialLinks, StaticBuilder,
};
pub use templates::TemplateEngine;
