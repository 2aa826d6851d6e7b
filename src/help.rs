//! Usage and help text for the orcaprep command line.

/// Prints the one-line usage summary to stderr.
pub fn print_usage(program: &str) {
    eprintln!("Usage: {} [-n|--dry-run] <descriptor.in>", program);
}

/// Prints the full help text to stdout.
pub fn print_help(program: &str) {
    println!("orcaprep - prepare and submit ORCA batch-queue jobs");
    println!();
    println!("Usage: {} [-n|--dry-run] <descriptor.in>", program);
    println!();
    println!("Reads the ORCA input file, extracts the requested processor count");
    println!("(inline '! PALn' keyword or '%pal nprocs n end' block, default 1),");
    println!("writes generated-<basename>-orca.script next to the input, and");
    println!("submits it with 'qsub -j oe -o <script>.out'.");
    println!();
    println!("Options:");
    println!("  -n, --dry-run   Write the script and report its path; skip qsub");
    println!("  -h, --help      Show this help");
    println!();
    println!("Site configuration (queue, modules, scratch root, ORCA root) is");
    println!("read from ./orcaprep.cfg, ~/.config/orcaprep/orcaprep.cfg, or");
    println!("/etc/orcaprep/orcaprep.cfg; built-in defaults apply otherwise.");
}
