use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::item::{Item, PageParams, PageResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS infra_demo (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    description TEXT
)";

/// Opens (or creates) the database and ensures the table exists.
/// A freshly created file database gets one example row when `seed` is set.
pub fn init_db(db_path: &str, seed: bool) -> rusqlite::Result<Connection> {
    let is_new = db_path == ":memory:" || !Path::new(db_path).exists();

    let conn = if db_path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(db_path)?
    };
    conn.execute(SCHEMA, [])?;

    if is_new {
        tracing::info!(db_path, "database created");
        if seed {
            insert(
                &conn,
                &Item {
                    id: None,
                    name: Some("Example Item".to_string()),
                    desc: Some("This is an example description".to_string()),
                },
            )?;
        }
    } else {
        tracing::info!(db_path, "database opened");
    }

    Ok(conn)
}

/// Escapes `LIKE` wildcards so user input matches literally under `ESCAPE '\'`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        desc: row.get(2)?,
    })
}

pub fn page(conn: &Connection, params: &PageParams) -> rusqlite::Result<PageResult<Item>> {
    let filter = params
        .name
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)));
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM infra_demo WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')",
        params![filter],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT id, name, description FROM infra_demo
         WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')
         ORDER BY id DESC LIMIT ?2 OFFSET ?3",
    )?;
    let items = stmt
        .query_map(
            params![filter, i64::from(params.page_size), params.offset() as i64],
            map_item,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(PageResult {
        items,
        total: total as u64,
    })
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Item>> {
    conn.query_row(
        "SELECT id, name, description FROM infra_demo WHERE id = ?1",
        params![id],
        map_item,
    )
    .optional()
}

/// Inserts `item`, ignoring any id it carries, and returns the new id.
pub fn insert(conn: &Connection, item: &Item) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO infra_demo (name, description) VALUES (?1, ?2)",
        params![item.name, item.desc],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites name and description of row `id`. Returns false if no row matched.
pub fn update(conn: &Connection, id: i64, item: &Item) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE infra_demo SET name = ?1, description = ?2 WHERE id = ?3",
        params![item.name, item.desc, id],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let removed = conn.execute("DELETE FROM infra_demo WHERE id = ?1", params![id])?;
    Ok(removed > 0)
}
