use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use heapdb::catalog::{Catalog, DataValue, RowSchema};
use heapdb::common::config::{StorageConfig, DEFAULT_CACHE_CAPACITY};
use heapdb::common::types::{PageId, RecordId, TableId, TxnId, DEFAULT_PAGE_SIZE};
use heapdb::storage::buffer::BufferPool;
use heapdb::storage::heap::{table_id_for_path, HeapFile};
use heapdb::storage::tuple::Tuple;

const CLI_TXN: TxnId = 1;

#[derive(Parser)]
#[command(author, version, about = "heapdb - inspect and edit heap table files")]
struct Cli {
    /// Table file path
    file: PathBuf,

    /// Row schema as name:type pairs, e.g. "id:int,name:text(32)"
    #[arg(short, long)]
    columns: String,

    /// Page size in bytes
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Buffer pool size (number of pages)
    #[arg(short, long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    buffer_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count and per-page slot usage
    Info,

    /// Print every stored tuple with its record ID
    Scan,

    /// Insert one row, given as one value per column
    Insert {
        values: Vec<String>,
    },

    /// Delete the row at a record ID
    Delete {
        page: u32,
        slot: u32,
    },
}

/// A single table opened through a buffer pool
struct Table {
    id: TableId,
    pool: BufferPool,
    file: Arc<HeapFile>,
}

impl Table {
    fn open(cli: &Cli) -> Result<Self> {
        let schema = RowSchema::parse(&cli.columns).map_err(|e| anyhow!(e))?;
        let config = StorageConfig::default()
            .with_page_size(cli.page_size)
            .with_cache_capacity(cli.buffer_size);

        let id = table_id_for_path(&cli.file)
            .with_context(|| format!("resolving {}", cli.file.display()))?;
        let catalog = Arc::new(Catalog::new(config.page_size));
        let file = catalog
            .add_table_with_id(&cli.file, id, schema)
            .with_context(|| format!("opening {}", cli.file.display()))?;
        let pool = BufferPool::new(catalog, &config)?;
        Ok(Self { id, pool, file })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let table = Table::open(&cli)?;

    match &cli.command {
        Commands::Info => show_info(&table),
        Commands::Scan => scan(&table),
        Commands::Insert { values } => insert(&table, values),
        Commands::Delete { page, slot } => delete(&table, *page, *slot),
    }
}

fn show_info(table: &Table) -> Result<()> {
    let num_pages = table.file.num_pages()?;
    println!("file:       {}", table.file.path().display());
    println!("schema:     {}", table.file.schema());
    println!("page size:  {} bytes", table.file.page_size());
    println!("slot width: {} bytes", table.file.schema().slot_width());
    println!("pages:      {}", num_pages);

    let mut total = 0;
    for page_no in 0..num_pages {
        let page = table.file.read_page(PageId::new(table.id, page_no))?;
        let used = page.slot_count() - page.free_slot_count();
        total += used;
        println!("  page {:>4}: {:>5}/{} slots used", page_no, used, page.slot_count());
    }
    println!("tuples:     {}", total);
    Ok(())
}

fn scan(table: &Table) -> Result<()> {
    let mut iter = table.file.iter(CLI_TXN, &table.pool);
    iter.open()?;
    let mut count = 0;
    while iter.has_next()? {
        let tuple = iter.next()?;
        let rid = tuple.record_id().map(|r| r.to_string()).unwrap_or_default();
        println!("{} {}", rid, tuple);
        count += 1;
    }
    iter.close();
    println!("{} tuple(s)", count);
    Ok(())
}

fn insert(table: &Table, raw: &[String]) -> Result<()> {
    let schema = table.file.schema();
    if raw.len() != schema.num_columns() {
        bail!("expected {} values, got {}", schema.num_columns(), raw.len());
    }

    let values = schema
        .columns()
        .iter()
        .zip(raw)
        .map(|(column, s)| DataValue::parse(s, column.data_type()).map_err(|e| anyhow!(e)))
        .collect::<Result<Vec<_>>>()?;

    let mut tuple = Tuple::new(values);
    table.pool.insert_tuple(CLI_TXN, table.id, &mut tuple)?;
    table.pool.flush_all_pages()?;

    if let Some(rid) = tuple.record_id() {
        println!("inserted at {}", rid);
    }
    Ok(())
}

fn delete(table: &Table, page: u32, slot: u32) -> Result<()> {
    let rid = RecordId::new(PageId::new(table.id, page), slot);
    // The stored tuple carries its record ID; only that is needed to delete it
    let mut tuple = Tuple::new(Vec::new());
    tuple.set_record_id(Some(rid));

    table.pool.delete_tuple(CLI_TXN, &tuple)?;
    table.pool.flush_all_pages()?;
    println!("deleted {}", rid);
    Ok(())
}
