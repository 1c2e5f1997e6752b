// UI layer: provides a simple interactive menu using `dialoguer`.
// The functions are small and synchronous to make the flow easy to follow.

use crate::api::{Client, UploadResult};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const HISTORY_FILE: &str = ".ipfs_rpc_history";

/// Main interactive menu. Receives a `Client` and runs a simple select loop
/// until the user chooses "Exit". A failed action is reported and the loop
/// keeps going.
pub fn main_menu(client: Client) -> Result<()> {
    println!("Connected to {}", client.base_url().bold());
    loop {
        let items = vec![
            "Add file or directory",
            "Add from stdin",
            "Cat content",
            "Upload history",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        let outcome = match selection {
            0 => handle_add(&client),
            1 => handle_add_stdin(&client),
            2 => handle_cat(&client),
            3 => show_history(),
            4 => break,
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            println!("{} {:#}", "Error:".red(), e);
        }
    }
    Ok(())
}

/// Ask for a path and upload it, file or whole directory.
fn handle_add(client: &Client) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("File or directory path")
        .interact_text()?;
    let path = PathBuf::from(path.trim());

    let spinner = spinner("Uploading...")?;
    let results = client.add_all(&path);
    spinner.finish_and_clear();

    let results = results.with_context(|| format!("Upload of {} failed", path.display()))?;
    print_results(&results);
    record_history(&results);
    Ok(())
}

/// Upload whatever arrives on stdin under a chosen name.
fn handle_add_stdin(client: &Client) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("File name for the uploaded content")
        .interact_text()?;
    println!("Reading stdin until EOF (Ctrl-D)...");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let result = client
        .add_binary(&mut input, name.trim())
        .context("Upload from stdin failed")?;
    let results = [result];
    print_results(&results);
    record_history(&results);
    Ok(())
}

/// Pick a CID (from history or typed) and save its content.
fn handle_cat(client: &Client) -> Result<()> {
    let history = history_path().map(|p| read_history(&p)).unwrap_or_default();
    let cid = if history.is_empty() {
        prompt_cid()?
    } else {
        let mut items = vec!["Enter a CID".to_string()];
        items.extend(history.iter().map(|r| format!("{}  {}", r.hash, r.name)));
        match Select::new().items(&items).default(0).interact()? {
            0 => prompt_cid()?,
            n => history[n - 1].hash.clone(),
        }
    };

    let default_out = dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(&cid);
    let out: String = Input::new()
        .with_prompt("Save to (- for stdout)")
        .default(default_out.display().to_string())
        .interact_text()?;

    let spinner = spinner("Fetching...")?;
    let stream = client.cat(&cid);
    spinner.finish_and_clear();
    let mut stream = stream.with_context(|| format!("Cat of {} failed", cid))?;

    if out.trim() == "-" {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        io::copy(&mut stream, &mut lock).context("Failed to write content to stdout")?;
        lock.flush()?;
        println!();
    } else {
        let path = PathBuf::from(out.trim());
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(&mut stream, &mut writer)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;
        println!("{} {} bytes to {}", "Saved".green(), written, path.display());
    }
    Ok(())
}

fn prompt_cid() -> Result<String> {
    let cid: String = Input::new().with_prompt("CID").interact_text()?;
    Ok(cid.trim().to_string())
}

fn show_history() -> Result<()> {
    let path = history_path().context("No home directory to read history from")?;
    let history = read_history(&path);
    if history.is_empty() {
        println!("No uploads recorded yet.");
    }
    for entry in history {
        println!("{}  {}", entry.hash.as_str().cyan(), entry.name);
    }
    Ok(())
}

fn print_results(results: &[UploadResult]) {
    println!("{}", "Upload successful".green());
    for result in results {
        println!("  {}  {} ({} bytes)", result.hash.as_str().cyan(), result.name, result.size);
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// History lives in the user's home directory.
fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join(HISTORY_FILE))
}

/// Best effort: a history write failure should not fail the upload.
fn record_history(results: &[UploadResult]) {
    if let Some(path) = history_path() {
        if let Err(e) = append_history(&path, results) {
            tracing::warn!(path = %path.display(), error = %e, "could not record upload history");
        }
    }
}

/// Append one `hash<TAB>name` line per result.
fn append_history(path: &Path, results: &[UploadResult]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for result in results {
        writeln!(file, "{}\t{}", result.hash, result.name)?;
    }
    Ok(())
}

/// Load recorded uploads, most recent first. Malformed lines are skipped.
fn read_history(path: &Path) -> Vec<UploadResult> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return Vec::new(),
    };
    let mut entries: Vec<UploadResult> = data
        .lines()
        .filter_map(|line| {
            let (hash, name) = line.split_once('\t')?;
            if hash.is_empty() {
                return None;
            }
            Some(UploadResult {
                name: name.to_string(),
                hash: hash.to_string(),
                size: String::new(),
            })
        })
        .collect();
    entries.reverse();
    entries
}
