//! Tree transforms applied after building.
//!
//! A plugin either finishes its work immediately or hands back a future.
//! The synchronous parse path refuses the second kind instead of blocking
//! on it.

use std::future::Future;
use std::pin::Pin;

use crate::error::{ParseError, PluginError};
use crate::tree::Tree;

pub type PluginFuture = Pin<Box<dyn Future<Output = Result<Tree, PluginError>> + Send>>;

/// Outcome of [`Plugin::transform`].
pub enum Transform {
    Done(Result<Tree, PluginError>),
    Pending(PluginFuture),
}

impl Transform {
    pub fn is_pending(&self) -> bool {
        matches!(self, Transform::Pending(_))
    }
}

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn transform(&self, tree: Tree) -> Transform;
}

/// Runs `plugins` in order, failing on the first asynchronous one.
pub fn apply_sync(mut tree: Tree, plugins: &[&dyn Plugin]) -> Result<Tree, ParseError> {
    for plugin in plugins {
        tree = match plugin.transform(tree) {
            Transform::Done(result) => result?,
            Transform::Pending(_) => {
                return Err(ParseError::AsyncPluginInSyncParse {
                    plugin: plugin.name().to_string(),
                });
            }
        };
        tree.invalidate_index();
    }
    Ok(tree)
}

/// Runs `plugins` in order, awaiting asynchronous ones.
pub async fn apply_async(mut tree: Tree, plugins: &[&dyn Plugin]) -> Result<Tree, ParseError> {
    for plugin in plugins {
        tree = match plugin.transform(tree) {
            Transform::Done(result) => result?,
            Transform::Pending(fut) => fut.await?,
        };
        tree.invalidate_index();
    }
    Ok(tree)
}
