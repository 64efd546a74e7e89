use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Error;
use simple_logger::SimpleLogger;

use grouped_text_sort::collation::Collation;
use grouped_text_sort::order::Order;
use grouped_text_sort::reorder::Reorder;

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn create_input(path: &Path, lines: usize) -> Result<(), Error> {
    let keys = ["Smith", "adams", "Adams", "Émile", "Dr.Jones", "zimmer", "Øster"];
    let tails = ["NY", "CA", "WA", "TX", "Berlin", "Paris. FR", ""];
    let mut writer = BufWriter::new(File::create(path)?);
    for i in 0..lines {
        writeln!(writer, "{}. {}{:02}", keys[i * 5 % keys.len()], tails[i * 3 % tails.len()], i % 100)?;
    }
    writer.flush()?;
    Ok(())
}

fn reorder_natural(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    // natural collation and ascending order are the default
    let reorder = Reorder::new(input_path.to_path_buf(), output_path.to_path_buf());
    reorder.reorder()?;
    Ok(())
}

fn reorder_bytes_descending(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut reorder = Reorder::new(input_path.to_path_buf(), output_path.to_path_buf());
    reorder.with_collation(Collation::Bytes);
    reorder.with_order(Order::Desc);
    reorder.with_count_lines();
    reorder.reorder()?;
    Ok(())
}

fn reorder_locale(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut reorder = Reorder::new(input_path.to_path_buf(), output_path.to_path_buf());
    reorder.with_collation(Collation::Locale("C".to_string()));
    reorder.with_record_capacity(1000);
    reorder.reorder()?;
    Ok(())
}

// cargo run -r --example reorder_text_file
pub fn main() -> Result<(), Error> {
    SimpleLogger::new().init()?;
    let input_path = PathBuf::from("./target/log-1000.dat");
    let natural_path = PathBuf::from("./target/natural-1000.dat");
    let descending_path = PathBuf::from("./target/bytes-descending-1000.dat");
    let locale_path = PathBuf::from("./target/locale-1000.dat");

    create_input(&input_path, 1000)?;
    reorder_natural(&input_path, &natural_path)?;
    reorder_bytes_descending(&input_path, &descending_path)?;
    reorder_locale(&input_path, &locale_path)?;

    Ok(())
}
