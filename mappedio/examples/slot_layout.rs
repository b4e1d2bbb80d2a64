use mappedio::{DataInput, DataOutput, MMapFile, MappedIo, RandomAccessIo, Result};
use tempfile::tempdir;
use tracing::info;

// Each slot: occupied flag, hash, key and value as length-prefixed strings.
const SLOT_SIZE: u64 = 64;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempdir()?;
    let path = dir.path().join("level.bin");
    let entries = [("alpha", "première"), ("beta", "二番目"), ("gamma", "\u{1F600}")];

    let mut file = MMapFile::create(&path, SLOT_SIZE * entries.len() as u64)?;
    let mut io = MappedIo::new();
    io.reset(&mut file, 0, SLOT_SIZE)?;
    for (slot, (key, value)) in entries.iter().enumerate() {
        io.rebind(slot as u64 * SLOT_SIZE, SLOT_SIZE)?;
        io.write_boolean(true)?;
        io.write_long(key.len() as i64 * 31)?;
        io.write_utf(key)?;
        io.write_utf(value)?;
        info!(slot, used = io.position(), "wrote slot");
    }
    io.flush()?;
    drop(io);
    drop(file);

    println!("Reopening {}", path.display());
    let file = MMapFile::open(&path)?;
    let slots = file.len() as u64 / SLOT_SIZE;
    let mut io = MappedIo::with_buffer(file, 0, SLOT_SIZE)?;
    for slot in 0..slots {
        io.rebind(slot * SLOT_SIZE, SLOT_SIZE)?;
        if !io.read_boolean()? {
            continue;
        }
        let hash = io.read_long()?;
        let key = io.read_utf()?;
        let value = io.read_utf()?;
        println!("slot {slot}: {key} -> {value} (hash {hash}, {} bytes free)", io.remaining());
    }

    Ok(())
}
