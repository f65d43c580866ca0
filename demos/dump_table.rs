use bufmap::BufMap;
use bufmap::BufMapError;

fn show(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn main() -> Result<(), BufMapError> {
    let mut buffer = [0u8; 4096];
    let mut map = BufMap::with_default_config(&mut buffer)?;

    println!(
        "{} buckets, {} arena bytes",
        map.bucket_count(),
        map.bytes_remaining()
    );

    for (key, value) in [
        (b"key1", b"val1"),
        (b"key2", b"val2"),
        (b"key3", b"val3"),
        (b"key4", b"val4"),
    ] {
        map.insert(key, value)?;
    }

    map.reset_cursor();
    while let Some((key, value)) = map.next_item() {
        println!("{} => {}", show(key), show(value));
    }

    let probe = b"key5";
    let present = map.contains_key(probe);
    let removed = map.remove(probe)?;
    println!("{} present: {present}, removed: {removed}", show(probe));
    println!(
        "{} entries in {} buckets, {} arena bytes left",
        map.len(),
        map.used_buckets(),
        map.bytes_remaining()
    );

    Ok(())
}
