use std::path::Path;
use std::process;

use clap::Parser;

use summary_rs::common::io::file_size;
use summary_rs::common::io_error_msg;
use summary_rs::summary::{
    EXIT_FILE_INACCESSIBLE, ScanError, ScanParams, SummaryReport, adjust_workload, scan_file,
};

#[derive(Parser)]
#[command(
    name = "fsummary",
    about = "Print size, newline, alphanumeric and UTF-8 counts for FILE, scanned in parallel"
)]
struct Cli {
    /// File to summarize
    file: String,

    /// Number of worker threads
    num_threads: usize,

    /// Bytes each worker claims per dispatch round
    workload: u64,

    /// Per-worker read buffer size in bytes
    buffer_size: u64,
}

fn fatal(err: ScanError) -> ! {
    eprintln!("fsummary: {err}");
    process::exit(err.exit_code());
}

fn main() {
    summary_rs::common::reset_sigpipe();
    let cli = Cli::parse();

    // Validation order matters: buffer/workload relationship is checked
    // before positivity, so a zero workload with a positive buffer reports
    // "buffer exceeds given workload".
    if cli.file.len() >= 256 {
        fatal(ScanError::InvalidInput("file name too long".to_string()));
    }

    let path = Path::new(&cli.file);
    let file_size = match file_size(path) {
        Ok(size) => size,
        Err(e) => {
            eprintln!("fsummary: {}: {}", cli.file, io_error_msg(&e));
            process::exit(EXIT_FILE_INACCESSIBLE);
        }
    };

    if cli.workload > file_size {
        fatal(ScanError::InvalidInput(
            "workload exceeds file size".to_string(),
        ));
    }
    if cli.buffer_size > cli.workload {
        fatal(ScanError::InvalidInput(
            "buffer exceeds given workload".to_string(),
        ));
    }
    if cli.num_threads == 0 || cli.workload == 0 || cli.buffer_size == 0 {
        fatal(ScanError::InvalidInput(
            "parameters must be positive".to_string(),
        ));
    }

    let workload = if cli.workload % cli.buffer_size != 0 {
        let adjusted = adjust_workload(cli.workload, cli.buffer_size);
        println!("Buffer does not divide the workload evenly.\nNew workload: {adjusted}");
        adjusted
    } else {
        cli.workload
    };

    let params = ScanParams {
        num_workers: cli.num_threads,
        workload,
        buffer_size: cli.buffer_size as usize,
    };
    let report = match scan_file(path, file_size, &params) {
        Ok(report) => report,
        Err(e) => fatal(e),
    };

    if report.workers_launched < report.workers_requested {
        eprintln!(
            "fsummary: started {}/{} worker threads",
            report.workers_launched, report.workers_requested
        );
    }
    for err in &report.worker_errors {
        eprintln!("fsummary: worker failed: {err}");
    }

    print_report(&report, &cli.file);
}

/// Print the final report. The UTF-8 unit count is shown only for files
/// that passed the compliance check.
fn print_report(report: &SummaryReport, filename: &str) {
    println!("{:<34}{}", "Total Size:", report.file_size);
    println!("{:<34}{}", "Newlines:", report.newlines);
    println!("{:<34}{}", "Alphanumeric characters:", report.alnum);
    println!();
    if report.utf8_compliant {
        println!("{filename} is UTF8 compliant.");
        println!("{:<34}{}", "UTF8 characters:", report.utf8_units);
    } else {
        println!("{filename} isn't UTF8 compliant.");
    }
}
