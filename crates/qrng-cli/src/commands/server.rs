pub fn run(host: &str, port: u16) {
    let rng = super::make_rng();
    let base = format!("http://{host}:{port}");

    println!("QRNG Server v{}", qrng_core::VERSION);
    println!("   {base}");
    println!();
    println!("   Endpoints:");
    println!("     GET /                  API index (try: curl {base})");
    println!("     GET /health            Health check with entropy estimate");
    println!("     GET /api/v1/random     Random bytes (ANU QRNG format)");
    println!("     GET /api/v1/uint64     Random 64-bit integer");
    println!("     GET /api/v1/double     Random double in [0, 1)");
    println!("     GET /api/v1/range32    Signed integer in [min, max]");
    println!("     GET /api/v1/range64    Unsigned integer in [min, max]");
    println!("     GET /api/v1/entropy    Entropy estimate");
    println!("     GET /api/v1/error/N    Error code description");
    println!();
    println!("   Query params for /api/v1/random:");
    println!("     length=N               Bytes to return (1-65536, default: 1024)");
    println!("     type=hex16|uint8|uint16|hex  Output format (default: hex16)");
    println!();
    println!("   Examples:");
    println!("     curl {base}/api/v1/random?length=32&type=uint8");
    println!("     curl '{base}/api/v1/range32?min=1&max=6'");
    println!();

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| super::fail(e));
    if let Err(e) = rt.block_on(qrng_server::run_server(rng, host, port)) {
        super::fail(format!("Server stopped: {e}"));
    }
}
