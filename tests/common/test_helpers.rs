use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use url::Url;

/// Temporary directory holding the files of one test
pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Write `content` to `name`, creating parent directories
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// `file:` URL of the workspace directory, usable as a base
    pub fn base_url(&self) -> Url {
        Url::from_directory_path(self.temp_dir.path()).unwrap()
    }

    pub fn file_url(&self, name: &str) -> Url {
        Url::from_file_path(self.path(name)).unwrap()
    }
}

pub const SAMPLE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<order id="o-17">
    <line sku="A1">  two   widgets  </line>
    <note><![CDATA[keep   as is]]></note>
</order>"#;

pub const SAMPLE_STYLESHEET: &str = r#"<xsl:stylesheet version="1.0"
    xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
    <xsl:template match="/"><xsl:copy-of select="."/></xsl:template>
</xsl:stylesheet>"#;
