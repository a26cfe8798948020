//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use search_index_explorer::SearchIndex;
use search_index_explorer::parsers::parse_search_index;
use tempfile::TempDir;

/// Path to a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Raw bytes of a fixture, as text
pub fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

/// Parse a fixture into an index
pub fn load_fixture(name: &str) -> SearchIndex {
    parse_search_index(&fixture_text(name)).expect("Fixture is not a valid index")
}

/// Assembled by hand in the generator's byte format, trimmed to the API pages
pub const API_FIXTURE: &str = "api_searchindex.js";
/// Generator output for the full project documentation
pub const GUIDE_FIXTURE: &str = "guide_searchindex.js";
/// Generator output for the package reference build
pub const MODULES_FIXTURE: &str = "modules_searchindex.js";

/// Builder for throwaway documentation source trees
pub struct DocsTreeBuilder {
    temp_dir: TempDir,
}

impl DocsTreeBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a page at `relative` (e.g. `guide/intro.rst`), creating parent directories
    pub fn with_page(self, relative: &str, content: &str) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create page directory");
        }
        fs::write(&path, content).expect("Failed to write page");
        self
    }

    /// Write raw bytes, for unreadable or non-UTF-8 pages
    pub fn with_bytes(self, relative: &str, bytes: &[u8]) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create page directory");
        }
        fs::write(&path, bytes).expect("Failed to write page");
        self
    }

    /// A small three-page project with an API reference
    pub fn with_sample_project(self) -> Self {
        self.with_page("index.rst", SAMPLE_INDEX)
            .with_page("getting_started.rst", SAMPLE_GETTING_STARTED)
            .with_page("api.rst", SAMPLE_API)
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for DocsTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an index file into a fresh temp directory
pub fn write_index_file(text: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("searchindex.js");
    fs::write(&path, text).expect("Failed to write index");
    (dir, path)
}

pub const SAMPLE_INDEX: &str = "\
LangGraph Log Parser documentation
==================================

.. toctree::
   :maxdepth: 2

   getting_started
   api

Indices and tables
==================

Parse event logs produced by graph runs.
";

pub const SAMPLE_GETTING_STARTED: &str = "\
Getting Started
===============

Creating experiment
-------------------

Every experiment keeps its CSV files and images in separate directories.

Exporting SQLite to JSON's
--------------------------

Use :func:`export_sqlite_to_log` to convert the checkpoint database.

.. index::
   single: checkpoint; database
";

pub const SAMPLE_API: &str = "\
API Reference
=============

langgraph_log_parser.experiment
-------------------------------

.. py:module:: langgraph_log_parser.experiment

.. py:class:: ExperimentPaths(name)

   Paths used by an experiment.

   .. py:method:: get_csv_path()

      Return the CSV directory.

   .. py:property:: csv_dir

.. py:function:: create_experiment(name)

   Create the experiment directories.

langgraph_log_parser.sql_to_log
-------------------------------

.. py:module:: langgraph_log_parser.sql_to_log

.. py:function:: export_sqlite_to_log(db_path, output)

   Export checkpoints from a SQLite database to a log file.
";
