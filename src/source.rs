// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Where the feed text comes from. Processing only ever sees whole file
//! contents, so a source is nothing more than "give me this file".

use crate::feed::FeedFile;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request for {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

pub trait FeedSource {
    /// `Ok(None)` when the file is simply not part of this feed.
    fn read(&self, file: FeedFile) -> Result<Option<String>, SourceError>;
}

/// An unzipped feed on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }
}

impl FeedSource for DirectorySource {
    fn read(&self, file: FeedFile) -> Result<Option<String>, SourceError> {
        let path = self.root.join(file.file_name());
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SourceError::Io { path, source }),
        }
    }
}

/// Fetches `<base_url>/<file>.txt` for each file.
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .gzip(true)
            .build()
            .map_err(|source| SourceError::Http {
                url: base_url.to_string(),
                source,
            })?;

        Ok(HttpSource::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::blocking::Client) -> Self {
        HttpSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn url_for(&self, file: FeedFile) -> String {
        format!("{}/{}", self.base_url, file.file_name())
    }
}

impl FeedSource for HttpSource {
    fn read(&self, file: FeedFile) -> Result<Option<String>, SourceError> {
        let url = self.url_for(file);
        log::debug!("Fetching {}", url);

        let response = self.client.get(&url).send().map_err(|source| SourceError::Http {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        response
            .text()
            .map(Some)
            .map_err(|source| SourceError::Http { url, source })
    }
}

/// Feed files held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub files: BTreeMap<FeedFile, String>,
}

impl MemorySource {
    pub fn with_file(mut self, file: FeedFile, text: impl Into<String>) -> Self {
        self.files.insert(file, text.into());
        self
    }

    pub fn without(mut self, file: FeedFile) -> Self {
        self.files.remove(&file);
        self
    }
}

impl FeedSource for MemorySource {
    fn read(&self, file: FeedFile) -> Result<Option<String>, SourceError> {
        Ok(self.files.get(&file).cloned())
    }
}
