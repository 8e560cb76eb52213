use crate::model::{DateRange, SalesRecord, StorageError, StoreScope, VisitRecord};
use crate::utils::{parse_day, to_count};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;

/// SQLite database shared with the counter and ERP sync jobs.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and makes sure the expected tables exist
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS stores (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS visit_counts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                store_id TEXT NOT NULL,
                date TEXT NOT NULL,
                visitor_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS sales_counts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                store_id TEXT,
                date TEXT NOT NULL,
                revenue REAL NOT NULL DEFAULT 0,
                order_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_visit_counts_store ON visit_counts(store_id);
            CREATE INDEX IF NOT EXISTS idx_sales_counts_store ON sales_counts(store_id);
            "
        )?;

        // Newer counter firmware also reports till data per day
        Self::migrate_add_column_if_missing(&conn, "visit_counts", "sales_count", "INTEGER")?;
        Self::migrate_add_column_if_missing(&conn, "visit_counts", "revenue", "REAL")?;

        Ok(Self { conn })
    }

    /// Adds the column to the table unless it is already there
    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn save_store(&self, id: &str, name: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO stores (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn save_visit(&self, record: &VisitRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO visit_counts (store_id, date, visitor_count, sales_count, revenue)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &record.store_id,
                &record.date,
                record.visitor_count as i64,
                record.sales_count.map(|c| c as i64),
                record.revenue,
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn save_sales(&self, record: &SalesRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO sales_counts (store_id, date, revenue, order_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &record.store_id,
                &record.date,
                record.revenue,
                record.order_count as i64,
            ],
        )?;
        Ok(())
    }

    /// Store ids known from the store table or seen in either source's data
    pub fn known_stores(&self) -> Result<HashSet<String>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM stores
             UNION
             SELECT DISTINCT store_id FROM visit_counts
             UNION
             SELECT DISTINCT store_id FROM sales_counts WHERE store_id IS NOT NULL",
        )?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// Counter rows for the scope whose normalized date falls inside `range`.
    /// Dates are stored as the sync job wrote them, so range filtering
    /// happens after parsing rather than in SQL.
    pub fn visit_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<VisitRecord>, StorageError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT store_id, date, visitor_count, sales_count, revenue
             FROM visit_counts
             WHERE ?1 IS NULL OR store_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![scope.store_id()], Self::map_visit)?;
        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            if Self::keeps(&record.date, range) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// ERP rows for the scope. The aggregate scope also returns the
    /// all-stores rows (`store_id IS NULL`).
    pub fn sales_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<SalesRecord>, StorageError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT store_id, date, revenue, order_count
             FROM sales_counts
             WHERE ?1 IS NULL OR store_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![scope.store_id()], Self::map_sales)?;
        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            if Self::keeps(&record.date, range) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Unparseable dates are passed through so the merge step can report them.
    fn keeps(raw: &str, range: &DateRange) -> bool {
        parse_day(raw).is_none_or(|d| range.contains(d))
    }

    fn map_visit(row: &Row) -> Result<VisitRecord, rusqlite::Error> {
        Ok(VisitRecord {
            store_id: row.get(0)?,
            date: row.get(1)?,
            visitor_count: to_count(row.get(2)?),
            sales_count: row.get::<_, Option<i64>>(3)?.map(to_count),
            revenue: row.get(4)?,
        })
    }

    fn map_sales(row: &Row) -> Result<SalesRecord, rusqlite::Error> {
        Ok(SalesRecord {
            store_id: row.get(0)?,
            date: row.get(1)?,
            revenue: row.get(2)?,
            order_count: to_count(row.get(3)?),
        })
    }
}
