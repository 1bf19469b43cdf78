//! Extension packaging: the catalog script, the `.control` file and the
//! PGXS `Makefile`.

use std::fmt::Write;

use pgmod_types::GeneratedArtifact;

/// Default extension version.
pub const DEFAULT_VERSION: &str = "0.1";

/// Naming and metadata of one extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension<'a> {
    /// Module name: base name of the module directory and of the `.so`.
    pub name: &'a str,
    pub version: &'a str,
    pub description: Option<&'a str>,
}

impl<'a> Extension<'a> {
    pub fn new(name: &'a str, version: &'a str) -> Self {
        Self {
            name,
            version,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<&'a str>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    /// `<m>--<v>.sql`
    pub fn script_file_name(&self) -> String {
        format!("{}--{}.sql", self.name, self.version)
    }

    /// `<m>.control`
    pub fn control_file_name(&self) -> String {
        format!("{}.control", self.name)
    }

    /// `<m>.so`
    pub fn library_file_name(&self) -> String {
        format!("{}.so", self.name)
    }

    /// Catalog script: the psql guard, then each routine's DDL followed by
    /// its comment or a blank line.
    pub fn sql_script(&self, artifacts: &[GeneratedArtifact]) -> String {
        let mut out = String::new();
        out.push_str(
            "-- complain if script is sourced in psql, rather than via CREATE EXTENSION\n",
        );
        let _ = writeln!(
            out,
            "\\echo Use \"CREATE EXTENSION {}\" to load this file. \\quit",
            self.name
        );
        for artifact in artifacts {
            let _ = writeln!(out, "{}", artifact.ddl);
            match &artifact.comment {
                Some(comment) => {
                    let _ = writeln!(out, "{comment}\n");
                }
                None => out.push('\n'),
            }
        }
        out
    }

    pub fn control_file(&self) -> String {
        let comment = match self.description {
            Some(description) => description.replace('\'', "''"),
            None => format!("{} extension", self.name),
        };
        format!(
            "# {name} extension\ncomment = '{comment}'\ndefault_version = '{version}'\nrelocatable = true\n",
            name = self.name,
            version = self.version,
        )
    }

    pub fn makefile(&self) -> String {
        format!(
            "EXTENSION = {name}\n\
             DATA = {script}\n\
             MODULES = {name}\n\
             \n\
             # postgres build stuff\n\
             PG_CONFIG = pg_config\n\
             PGXS := $(shell $(PG_CONFIG) --pgxs)\n\
             include $(PGXS)\n",
            name = self.name,
            script = self.script_file_name(),
        )
    }
}
