use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use jit_sdk::{Object, ObjectId, Repository, RepositoryConfig};
use jit_store::{ObjectData, REGULAR_FILE_MODE};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::Commit(args) => cmd_commit(args),
        Command::CatFile(args) => cmd_cat_file(args),
        Command::Log(args) => cmd_log(args),
    }
}

fn open_current() -> anyhow::Result<Repository> {
    Repository::open(".", RepositoryConfig::from_env()).context("cannot open repository")
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let path = args.path.unwrap_or_else(|| ".".into());
    let repo = Repository::initialize(&path, RepositoryConfig::from_env())
        .with_context(|| format!("cannot initialize repository in {path}"))?;
    let git_dir = std::fs::canonicalize(repo.git_dir())
        .unwrap_or_else(|_| repo.git_dir().to_path_buf());
    println!(
        "{} Initialized empty repository in {}",
        "✓".green().bold(),
        git_dir.display().to_string().bold()
    );
    Ok(())
}

fn cmd_commit(args: CommitArgs) -> anyhow::Result<()> {
    let repo = open_current()?;
    let id = repo.commit(&args.message).context("commit failed")?;
    let commit = repo.read_commit(&id)?;
    let root = if commit.parent.is_none() { "root-commit " } else { "" };
    let summary = args.message.lines().next().unwrap_or_default();
    println!("[{}{}] {}", root, id.short_hex().yellow(), summary);
    Ok(())
}

fn cmd_cat_file(args: CatFileArgs) -> anyhow::Result<()> {
    let repo = open_current()?;
    let id = ObjectId::from_hex(&args.object)
        .with_context(|| format!("invalid object id {}", args.object))?;
    let object = repo.read_object(&id)?;

    if args.kind {
        println!("{}", object.kind());
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    match &object {
        Object::Blob(blob) => stdout.write_all(&blob.data)?,
        Object::Tree(tree) => {
            for entry in &tree.entries {
                writeln!(stdout, "{REGULAR_FILE_MODE} blob {}\t{}", entry.object_id, entry.name)?;
            }
        }
        Object::Commit(commit) => stdout.write_all(&commit.serialize())?,
    }
    stdout.flush()?;
    Ok(())
}

fn cmd_log(args: LogArgs) -> anyhow::Result<()> {
    let repo = open_current()?;
    let mut stdout = std::io::stdout().lock();
    write_log(&repo, &args, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn write_log(repo: &Repository, args: &LogArgs, out: &mut impl Write) -> anyhow::Result<()> {
    if repo.head()?.is_none() {
        writeln!(out, "No commits yet.")?;
        return Ok(());
    }

    for entry in repo.log(args.limit)? {
        let summary = entry.commit.message.lines().next().unwrap_or_default();
        if args.oneline {
            writeln!(out, "{} {}", entry.id.short_hex().yellow(), summary)?;
            continue;
        }
        let author = &entry.commit.author;
        writeln!(out, "{} {}", "commit".yellow(), entry.id.to_string().yellow())?;
        writeln!(out, "Author: {} <{}>", author.name, author.email)?;
        writeln!(out, "Date:   {}", author.when.to_string().dimmed())?;
        writeln!(out)?;
        for line in entry.commit.message.lines() {
            writeln!(out, "    {line}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
