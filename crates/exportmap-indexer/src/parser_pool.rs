//! Thread-safe parser pool for tree-sitter parsers
//!
//! Tree-sitter parsers are not `Sync` and are expensive enough to keep around,
//! so each worker thread owns one and requests are handed over a channel.
//! Callers can [`submit`](ParserPool::submit) many files before waiting on any
//! of them, which lets a whole package parse in parallel while the results are
//! still consumed in submission order.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use tree_sitter::{Language, Parser};

/// Source dialects the pool can parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`)
    TypeScript,
    /// TypeScript with embedded JSX markup (`.tsx`)
    Tsx,
}

impl SourceDialect {
    /// Determine the dialect from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "ts" | "mts" | "cts" => Some(SourceDialect::TypeScript),
            "tsx" => Some(SourceDialect::Tsx),
            _ => None,
        }
    }

    /// Get the tree-sitter language for this dialect
    pub fn get_language(&self) -> Language {
        match self {
            SourceDialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceDialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceDialect::TypeScript => "typescript",
            SourceDialect::Tsx => "tsx",
        }
    }
}

/// A parsing request sent to the parser pool
#[derive(Debug)]
pub struct ParseRequest {
    pub dialect: SourceDialect,
    pub content: String,
    pub path: PathBuf,
}

impl ParseRequest {
    /// Build a request, picking the dialect from the path (TypeScript by default).
    pub fn for_file(path: impl Into<PathBuf>, content: String) -> Self {
        let path = path.into();
        let dialect = SourceDialect::from_path(&path).unwrap_or(SourceDialect::TypeScript);
        ParseRequest { dialect, content, path }
    }
}

/// Result of a parsing operation
#[derive(Debug)]
pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub path: PathBuf,
    pub content: String,
}

/// Internal message for the parser worker
#[derive(Debug)]
struct WorkerRequest {
    request: ParseRequest,
    response_sender: Sender<Result<ParseResult>>,
}

/// A submitted request whose result has not been collected yet
#[derive(Debug)]
pub struct PendingParse {
    path: PathBuf,
    receiver: Receiver<Result<ParseResult>>,
}

impl PendingParse {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the worker replies
    pub fn wait(self) -> Result<ParseResult> {
        self.receiver
            .recv()
            .map_err(|_| anyhow::anyhow!("Parser worker died"))?
    }
}

/// Thread-safe parser pool
pub struct ParserPool {
    sender: Sender<WorkerRequest>,
    workers: usize,
}

impl ParserPool {
    /// Create a new parser pool with the specified number of worker threads
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let (sender, receiver) = mpsc::channel::<WorkerRequest>();
        let receiver = Arc::new(Mutex::new(receiver));

        for i in 0..num_workers {
            let receiver = Arc::clone(&receiver);
            let spawned = std::thread::Builder::new()
                .name(format!("exportmap-parser-{i}"))
                .spawn(move || Self::worker_thread(i, receiver));
            if let Err(e) = spawned {
                tracing::error!("Failed to spawn parser worker {}: {}", i, e);
            }
        }

        Self {
            sender,
            workers: num_workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Worker thread function that processes parsing requests
    fn worker_thread(worker_id: usize, receiver: Arc<Mutex<Receiver<WorkerRequest>>>) {
        tracing::debug!("Parser worker {} started", worker_id);

        let mut parser = Parser::new();
        let mut current: Option<SourceDialect> = None;

        loop {
            let next = receiver
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv();
            let WorkerRequest {
                request,
                response_sender,
            } = match next {
                Ok(req) => req,
                Err(_) => {
                    tracing::debug!("Parser worker {} shutting down", worker_id);
                    break;
                }
            };

            if current != Some(request.dialect) {
                let language = request.dialect.get_language();
                if let Err(e) = parser.set_language(&language) {
                    let _ = response_sender.send(Err(anyhow::anyhow!(
                        "Failed to set language {}: {}",
                        request.dialect.name(),
                        e
                    )));
                    continue;
                }
                current = Some(request.dialect);
            }

            let result = match parser.parse(&request.content, None) {
                Some(tree) => Ok(ParseResult {
                    tree,
                    path: request.path,
                    content: request.content,
                }),
                None => Err(anyhow::anyhow!("Parser produced no syntax tree")),
            };

            if response_sender.send(result).is_err() {
                tracing::warn!("Failed to send parse result back to caller");
            }
        }
    }

    /// Queue a request without waiting for it
    pub fn submit(&self, request: ParseRequest) -> Result<PendingParse> {
        let (response_sender, receiver) = mpsc::channel();
        let path = request.path.clone();

        self.sender
            .send(WorkerRequest {
                request,
                response_sender,
            })
            .map_err(|_| anyhow::anyhow!("Parser pool is shut down"))?;

        Ok(PendingParse { path, receiver })
    }

    /// Parse content synchronously using the parser pool
    /// Note: This blocks the current thread until parsing is complete
    pub fn parse_blocking(&self, request: ParseRequest) -> Result<ParseResult> {
        self.submit(request)?.wait()
    }

    /// Parse content asynchronously using the parser pool
    pub async fn parse(&self, request: ParseRequest) -> Result<ParseResult> {
        let pending = self.submit(request)?;
        tokio::task::spawn_blocking(move || pending.wait())
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

impl Clone for ParserPool {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            workers: self.workers,
        }
    }
}

impl std::fmt::Debug for ParserPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserPool")
            .field("workers", &self.workers)
            .finish()
    }
}

/// Convenience function to create a parser pool with default settings
pub fn create_parser_pool() -> ParserPool {
    ParserPool::new(exportmap_core::config::default_workers())
}
