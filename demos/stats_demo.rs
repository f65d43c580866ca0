use bufmap::BufMap;
use bufmap::FoldHash;
use bufmap::default_config;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 's', long = "buffer_size", default_value_t = 1 << 16)]
    buffer_size: usize,

    #[arg(short = 'n', long = "items", default_value_t = 1000)]
    items: usize,

    #[arg(short = 'b', long = "bucket_count")]
    bucket_count: Option<u32>,

    #[arg(long = "foldhash")]
    foldhash: bool,

    #[arg(short = 'r', long = "remove_every", default_value_t = 0)]
    remove_every: usize,
}

fn key(i: usize) -> String {
    format!("key_{i:08}")
}

fn fill<H: bufmap::KeyHasher>(map: &mut BufMap<'_, H>, args: &Args) {
    let mut num_failures = 0;
    for i in 0..args.items {
        let value = format!("value_{i}");
        if let Err(err) = map.insert(key(i).as_bytes(), value.as_bytes()) {
            if num_failures == 0 {
                println!("First failure at item {i}: {err}");
            }
            num_failures += 1;
        }
    }
    println!("Inserted {} items, {} failures", map.len(), num_failures);

    if args.remove_every > 0 {
        let mut removed = 0;
        for i in (0..args.items).step_by(args.remove_every) {
            if map.remove(key(i).as_bytes()) == Ok(true) {
                removed += 1;
            }
        }
        println!("Removed {removed} items");
    }

    map.stats().print();
}

fn main() {
    let args = Args::parse();

    let mut config = default_config(args.buffer_size);
    if let Some(bucket_count) = args.bucket_count {
        config = config.with_bucket_count(bucket_count);
    }

    println!(
        "Creating BufMap in {} bytes with {} buckets",
        args.buffer_size, config.bucket_count
    );

    let mut buffer = vec![0u8; args.buffer_size];
    let result = if args.foldhash {
        BufMap::new(&mut buffer, config.with_hasher(FoldHash::default()))
            .map(|mut map| fill(&mut map, &args))
    } else {
        BufMap::new(&mut buffer, config).map(|mut map| fill(&mut map, &args))
    };

    if let Err(err) = result {
        eprintln!("Could not create map: {err}");
        std::process::exit(1);
    }
}
