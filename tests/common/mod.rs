use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grouped_text_sort::collation::Collator;
use grouped_text_sort::order::Order;

pub fn setup() {
    let results_dir_path = PathBuf::from_str("./target/results/").unwrap();

    if !results_dir_path.exists() {
        fs::create_dir_all(&results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create results directory: {:?}", results_dir_path)
        );
    } else {
        println!("Results directory exists at {:?}", results_dir_path);
    }
}

#[allow(dead_code)]
pub fn read_lines(path: PathBuf) -> Result<Vec<String>, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().map(|x| x.unwrap()).collect();
    Ok(lines)
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &str) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

#[allow(dead_code)]
pub fn write_file(path: &PathBuf, content: &str) -> Result<(), anyhow::Error> {
    fs::write(path, content)?;
    Ok(())
}

/// Fields of a generated input line
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct GeneratedLine {
    pub key: String,
    pub tail: String,
    pub code: u32,
}

#[allow(dead_code)]
const KEYS: [&str; 12] = [
    "Smith", "smith", "Adams", "adams", "Dr.Jones", "O'Brien", "van Dijk", "Zimmer",
    "Émile", "Øster", "Jr.Smith.Sr", "A",
];

#[allow(dead_code)]
const TAIL_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 .";

/// Write `lines` random lines to `path` and return their fields
#[allow(dead_code)]
pub fn generate_input(path: &PathBuf, lines: usize, seed: u64) -> Result<Vec<GeneratedLine>, anyhow::Error> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = BufWriter::new(File::create(path)?);
    let mut generated = Vec::with_capacity(lines);
    for i in 0..lines {
        let key = if i % 5 == 0 {
            format!("Key {}", rng.gen_range(0..50))
        } else {
            KEYS[rng.gen_range(0..KEYS.len())].to_string()
        };
        let tail_length = rng.gen_range(0..=10);
        let tail: String = (0..tail_length)
            .map(|_| TAIL_CHARS[rng.gen_range(0..TAIL_CHARS.len())] as char)
            .collect();
        let code = rng.gen_range(0..100);
        writeln!(writer, "{}. {}{:02}", key, tail, code)?;
        generated.push(GeneratedLine { key, tail, code });
    }
    writer.flush()?;
    Ok(generated)
}

/// Expected output lines, computed without the crate's pipeline
#[allow(dead_code)]
pub fn expected_output<C: Collator>(generated: &[GeneratedLine], collator: &C, order: &Order) -> Result<Vec<String>, anyhow::Error> {
    let mut keyed = Vec::with_capacity(generated.len());
    for line in generated {
        keyed.push((collator.sort_key(&line.key)?, line));
    }
    keyed.sort_by(|a, b| {
        let keys = match order {
            Order::Asc => collator.compare(&a.0, &b.0),
            Order::Desc => collator.compare(&b.0, &a.0),
        };
        keys
            .then_with(|| a.1.code.cmp(&b.1.code))
            .then_with(|| a.1.tail.as_bytes().cmp(b.1.tail.as_bytes()))
    });
    Ok(keyed.into_iter().map(|(_, line)| format!("{}. {}", line.key, line.tail)).collect())
}
