use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL,
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // Databases created before updated_at existed
    let updated_at_columns: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('kv') WHERE name = 'updated_at'",
        [],
        |row| row.get(0),
    )?;
    if updated_at_columns == 0 {
        conn.execute_batch("ALTER TABLE kv ADD COLUMN updated_at TEXT NOT NULL DEFAULT ''")?;
    }

    Ok(())
}
