//! # Pagecraft HTML Compiler
//!
//! Deterministic projection of a page tree into static markup.
//!
//! Rendering is a post-order walk from the root: a node's children are
//! rendered first and concatenated in order, then wrapped according to the
//! [`RenderRule`] registered for the node's `type_name`. Unknown block kinds
//! fall back to a plain `<div>` around their children.
//!
//! ```rust,ignore
//! use pagecraft_compiler_html::{compile_to_html, CompileOptions, RenderMode};
//!
//! let published = compile_to_html(&tree, &CompileOptions::default());
//! let preview = compile_to_html(&tree, &CompileOptions::for_mode(RenderMode::Edit));
//! ```

mod compiler;
mod rules;


pub use compiler::{compile_to_html, CompileOptions, Compiler, RenderMode};
pub use rules::{
    AnimateRule, Body, Element, HeadingRule, RenderRegistry, RenderRule, TextRule, WrapperRule,
};
