use log::LevelFilter;

use crate::cli::{Args, ColorChoice};

/// Hard limits shared by the parser and the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum parameters in a declaration and arguments in a call.
    pub max_params: usize,
    /// Maximum nesting of active user function calls.
    pub max_call_depth: usize,
    /// Maximum height of an expression tree, counting operators, calls and
    /// parentheses.
    pub max_expr_depth: usize,
}

impl Limits {
    pub const DEFAULT_MAX_PARAMS: usize = 8;
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;
    pub const DEFAULT_MAX_EXPR_DEPTH: usize = 256;

    pub fn with_max_params(mut self, max_params: usize) -> Self {
        self.max_params = max_params;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_max_expr_depth(mut self, max_expr_depth: usize) -> Self {
        self.max_expr_depth = max_expr_depth;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_params: Self::DEFAULT_MAX_PARAMS,
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            max_expr_depth: Self::DEFAULT_MAX_EXPR_DEPTH,
        }
    }
}

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: u8,
    pub limits: Limits,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr),
        };

        let mut limits = Limits::default();
        if let Some(depth) = args.max_depth {
            limits = limits.with_max_call_depth(depth);
        }
        if let Some(params) = args.max_params {
            limits = limits.with_max_params(params);
        }
        if let Some(depth) = args.max_expr_depth {
            limits = limits.with_max_expr_depth(depth);
        }

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            limits,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Off,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
