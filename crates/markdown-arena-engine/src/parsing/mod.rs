//! # Parsing Pipeline
//!
//! source → block tokenizer → [`builder`] (inline tokenizer per block) → [`Tree`].
//!
//! [`Parser`] owns the options and the node pool and is what the incremental
//! and streaming parsers drive. The free functions [`parse`] and
//! [`parse_async`] cover one-shot use.

pub mod blocks;
pub mod builder;
pub mod inline;
pub mod options;
pub mod plugin;
pub mod rope;
pub mod snapshot;
pub mod text;

#[cfg(test)]
mod tests;

use crate::error::{OptionsError, ParseError};
use crate::index::QueryIndex;
use crate::tree::{Node, NodePool, PoolStats, Position, Tree};

use blocks::{BatchTokenizer, BlockToken, BlockTokenizer};
use builder::TreeBuilder;
pub use options::ParseOptions;
pub use plugin::{Plugin, PluginFuture, Transform};

pub const DEFAULT_LANGUAGE: &str = "markdown";

/// Block tokens from whichever tokenizer the options select.
pub enum Tokens<'a> {
    Standard(BlockTokenizer<'a>),
    Batch(BatchTokenizer<'a>),
}

impl<'a> Tokens<'a> {
    pub fn position(&self) -> Position {
        match self {
            Tokens::Standard(t) => t.position(),
            Tokens::Batch(t) => t.position(),
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = BlockToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Tokens::Standard(t) => t.next(),
            Tokens::Batch(t) => t.next(),
        }
    }
}

pub struct Parser {
    options: ParseOptions,
    pool: NodePool,
    language: String,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            options: ParseOptions::default(),
            pool: NodePool::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Parser {
    /// Validates `options` before any work is done.
    pub fn new(options: ParseOptions) -> Result<Self, OptionsError> {
        Self::with_pool(options, NodePool::new())
    }

    /// Uses an existing pool, e.g. one shared by parsers on the same thread.
    pub fn with_pool(options: ParseOptions, pool: NodePool) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self {
            options,
            pool,
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Full tokenize + build, plus the index when `build_index` is set.
    pub fn parse(&mut self, source: &str) -> Tree {
        let tree = self.build(source, self.tokens(source));
        self.finish(tree)
    }

    /// Like [`Parser::parse`], then runs `plugins` in order. Fails if any
    /// plugin is asynchronous.
    pub fn parse_with_plugins(
        &mut self,
        source: &str,
        plugins: &[&dyn Plugin],
    ) -> Result<Tree, ParseError> {
        let tree = self.build(source, self.tokens(source));
        let tree = plugin::apply_sync(tree, plugins)?;
        Ok(self.finish(tree))
    }

    /// Like [`Parser::parse_with_plugins`], awaiting asynchronous plugins.
    /// Tokenizing and building never yield.
    pub async fn parse_async(
        &mut self,
        source: &str,
        plugins: &[&dyn Plugin],
    ) -> Result<Tree, ParseError> {
        let tree = self.build(source, self.tokens(source));
        let tree = plugin::apply_async(tree, plugins).await?;
        Ok(self.finish(tree))
    }

    pub fn tokens<'a>(&self, source: &'a str) -> Tokens<'a> {
        self.tokens_from(source, Position::ZERO)
    }

    /// Tokenizes from `start`, which must be a line start of `source`.
    pub fn tokens_from<'a>(&self, source: &'a str, start: Position) -> Tokens<'a> {
        if self.options.use_batch_tokenizer {
            Tokens::Batch(BatchTokenizer::starting_at(
                source,
                start,
                self.options.batch_size,
            ))
        } else {
            Tokens::Standard(BlockTokenizer::starting_at(source, start))
        }
    }

    /// Lowers `tokens` into a new tree over `source`. Does not build the index.
    pub fn build<'a, I>(&mut self, source: &str, tokens: I) -> Tree
    where
        I: IntoIterator<Item = BlockToken<'a>>,
    {
        let mut builder = self.builder(source);
        let mut count = 0usize;
        for token in tokens {
            count += 1;
            builder.push_block(&token);
        }
        let tree = builder.finish();
        log::debug!(
            "parsed {} bytes: {} block tokens, {} nodes",
            source.len(),
            count,
            tree.len()
        );
        tree
    }

    /// A builder over an empty tree for `source`, allocating from this
    /// parser's pool when pooling is on.
    pub(crate) fn builder(&mut self, source: &str) -> TreeBuilder<'_> {
        let tree = Tree::new(self.language.as_str(), source);
        self.resume(tree)
    }

    /// A builder that keeps appending top-level blocks to `tree`.
    pub(crate) fn resume(&mut self, tree: Tree) -> TreeBuilder<'_> {
        let pool = self.options.use_node_pool.then_some(&mut self.pool);
        TreeBuilder::new(tree, pool)
    }

    /// Adds the index to a finished tree when the options ask for one.
    pub(crate) fn finish(&self, mut tree: Tree) -> Tree {
        if self.options.build_index {
            let index = QueryIndex::from_tree(&tree);
            tree.set_index(index);
        }
        tree
    }

    /// Returns a tree's nodes to the pool. A no-op when pooling is off.
    pub fn recycle(&mut self, tree: Tree) {
        if self.options.use_node_pool {
            self.pool.release_tree(tree);
        }
    }

    pub fn recycle_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) {
        if self.options.use_node_pool {
            for node in nodes {
                self.pool.release(node);
            }
        }
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

/// Parses `source` with default options.
pub fn parse(source: &str) -> Tree {
    Parser::default().parse(source)
}

/// Parses `source` with `options`, rejecting invalid options up front.
pub fn parse_with(source: &str, options: ParseOptions) -> Result<Tree, ParseError> {
    Ok(Parser::new(options)?.parse(source))
}

/// Parses `source` and runs `plugins`, awaiting asynchronous ones.
pub async fn parse_async(
    source: &str,
    options: ParseOptions,
    plugins: &[&dyn Plugin],
) -> Result<Tree, ParseError> {
    let mut parser = Parser::new(options)?;
    parser.parse_async(source, plugins).await
}
