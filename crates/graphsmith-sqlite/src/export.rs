//! CSV export of the stored graph
//!
//! Two flat files: one row per node (`name,type,properties`) and one row
//! per edge (`source,type,target,properties`). Property bags are written
//! as JSON text in the last column.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{SqliteError, SqliteResult};
use crate::graph_store::SqliteGraphStore;

impl SqliteGraphStore {
    /// Write all entities as CSV: `name,type,properties`
    pub fn write_entities_csv<W: Write>(&self, writer: W) -> SqliteResult<u64> {
        self.pool().with_connection(|conn| {
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer.write_record(["name", "type", "properties"])?;

            let mut stmt =
                conn.prepare("SELECT name, label, properties FROM nodes ORDER BY name")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut count = 0u64;
            for row in rows {
                let (name, label, properties) = row?;
                csv_writer.write_record([name, label, properties])?;
                count += 1;
            }
            csv_writer
                .flush()
                .map_err(|e| SqliteError::Serialization(e.to_string()))?;

            info!(rows = count, "Exported entities to CSV");
            Ok(count)
        })
    }

    /// Write all relationships as CSV: `source,type,target,properties`
    pub fn write_relationships_csv<W: Write>(&self, writer: W) -> SqliteResult<u64> {
        self.pool().with_connection(|conn| {
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer.write_record(["source", "type", "target", "properties"])?;

            let mut stmt = conn.prepare(
                "SELECT source, label, target, properties FROM edges
                 ORDER BY source, target, label",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?;

            let mut count = 0u64;
            for row in rows {
                let (source, label, target, properties) = row?;
                csv_writer.write_record([source, label, target, properties])?;
                count += 1;
            }
            csv_writer
                .flush()
                .map_err(|e| SqliteError::Serialization(e.to_string()))?;

            info!(rows = count, "Exported relationships to CSV");
            Ok(count)
        })
    }

    /// Export entities to a CSV file, creating parent directories.
    pub fn export_entities_to_file(&self, path: impl AsRef<Path>) -> SqliteResult<u64> {
        self.write_entities_csv(create_file(path.as_ref())?)
    }

    /// Export relationships to a CSV file, creating parent directories.
    pub fn export_relationships_to_file(&self, path: impl AsRef<Path>) -> SqliteResult<u64> {
        self.write_relationships_csv(create_file(path.as_ref())?)
    }
}

fn create_file(path: &Path) -> SqliteResult<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SqliteError::Connection(format!("Failed to create directory: {}", e)))?;
    }
    std::fs::File::create(path)
        .map_err(|e| SqliteError::Connection(format!("Failed to create file: {}", e)))
}
