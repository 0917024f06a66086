//! The kitkat command-line dispatcher.
//!
//! Thin by design: parse the argument list, call exactly one engine
//! operation, map the result to output and an exit code. All repository
//! logic lives in the library.

use std::env;
use std::process::ExitCode;

use kitkat::repo::{log, MergeOutcome, Repository};
use kitkat::RepoError;

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("Usage: kitkat <command> [args]");
        return ExitCode::from(EXIT_USAGE);
    };

    match command.as_str() {
        "init" => cmd_init(),
        "add" => cmd_add(rest),
        "rm" => cmd_rm(rest),
        "mv" => cmd_mv(rest),
        "commit" => cmd_commit(rest),
        "status" => cmd_status(),
        "diff" => cmd_diff(rest),
        "log" => cmd_log(rest),
        "shortlog" => cmd_shortlog(),
        "branch" => cmd_branch(rest),
        "checkout" => cmd_checkout(rest),
        "merge" => cmd_merge(rest),
        "reset" => cmd_reset(rest),
        "tag" => cmd_tag(rest),
        "ls-files" => cmd_ls_files(),
        "clean" => cmd_clean(rest),
        "config" => cmd_config(rest),
        "show-object" => cmd_show_object(rest),
        "help" => cmd_help(rest),
        unknown => {
            eprintln!("Unknown command: {unknown}");
            print_general_help();
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Open the repository at the current directory or report the failure.
fn open_repo() -> Result<Repository, ExitCode> {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(ExitCode::from(EXIT_FAILURE));
        }
    };
    Repository::open(cwd).map_err(|e| fail(&e))
}

/// Print an operation failure and produce exit code 1.
fn fail(err: &RepoError) -> ExitCode {
    match err {
        // This one is conventional output, not an "Error:" banner.
        RepoError::NothingToCommit => eprintln!("{err}"),
        _ => eprintln!("Error: {err}"),
    }
    ExitCode::from(EXIT_FAILURE)
}

fn usage(text: &str) -> ExitCode {
    eprintln!("Usage: {text}");
    ExitCode::from(EXIT_USAGE)
}

fn cmd_init() -> ExitCode {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    match Repository::init(&cwd) {
        Ok(_) => {
            println!("Initialized empty kitkat repository in {}", cwd.join(".kitkat").display());
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_add(args: &[String]) -> ExitCode {
    if args.is_empty() {
        return usage("kitkat add [-A | --all] <file-path>...");
    }
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    if args[0] == "-A" || args[0] == "--all" {
        println!("Staging all changes...");
        return match repo.add_all() {
            Ok(()) => ExitCode::from(EXIT_OK),
            Err(e) => fail(&e),
        };
    }

    let mut code = EXIT_OK;
    for path in args {
        if let Err(e) = repo.add(path) {
            eprintln!("Error adding {path}: {e}");
            code = EXIT_FAILURE;
        }
    }
    ExitCode::from(code)
}

fn cmd_rm(args: &[String]) -> ExitCode {
    let [path] = args else {
        return usage("kitkat rm <file>");
    };
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.remove_file(path) {
        Ok(()) => {
            println!("Removed '{path}'");
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_mv(args: &[String]) -> ExitCode {
    let mut force = false;
    let mut paths = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-f" | "--force" => force = true,
            _ => paths.push(arg.clone()),
        }
    }
    let [old, new] = paths.as_slice() else {
        return usage("kitkat mv [-f|--force] <old_path> <new_path>");
    };

    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.move_file(old, new, force) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => fail(&e),
    }
}

fn cmd_commit(args: &[String]) -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    let commit_usage = "kitkat commit <-m | -am | --amend -m> <message>";
    let Some((flag, rest)) = args.split_first() else {
        return usage(commit_usage);
    };

    match flag.as_str() {
        "--amend" => {
            let Some((m_flag, msg_parts)) = rest.split_first() else {
                return usage("kitkat commit --amend -m <message>");
            };
            if m_flag != "-m" || msg_parts.is_empty() {
                return usage("kitkat commit --amend -m <message>");
            }
            let message = msg_parts.join(" ");
            match repo.amend(&message) {
                Ok(commit) => {
                    let state = repo.head_state().unwrap_or_else(|_| "HEAD".to_string());
                    println!("[{state} {}] {} (amended)", commit.id.short(), commit.message);
                    ExitCode::from(EXIT_OK)
                }
                Err(e) => fail(&e),
            }
        }
        "-m" | "-am" => {
            if rest.is_empty() {
                return usage(commit_usage);
            }
            let message = rest.join(" ");
            let result = if flag == "-am" {
                repo.commit_all(&message)
            } else {
                repo.commit(&message)
            };
            match result {
                Ok(outcome) => {
                    let state = repo.head_state().unwrap_or_else(|_| "HEAD".to_string());
                    println!(
                        "[{state} {}] {}\n{}",
                        outcome.commit.id.short(),
                        outcome.commit.message,
                        outcome.summary
                    );
                    ExitCode::from(EXIT_OK)
                }
                Err(e) => fail(&e),
            }
        }
        _ => usage(commit_usage),
    }
}

fn cmd_status() -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.status() {
        Ok(report) => {
            println!("On branch {}", report.head_state);
            println!("\nChanges to be committed:");
            for line in &report.staged {
                println!("\t{line}");
            }
            println!("\nChanges not staged for commit:");
            for line in &report.unstaged {
                println!("\t{line}");
            }
            println!("\nUntracked files:");
            for line in &report.untracked {
                println!("\t{line}");
            }
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_diff(args: &[String]) -> ExitCode {
    let staged = matches!(args.first().map(String::as_str), Some("--cached" | "--staged"));
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.diff(staged) {
        Ok(out) => {
            print!("{out}");
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_log(args: &[String]) -> ExitCode {
    let mut oneline = false;
    let mut limit = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--oneline" => {
                oneline = true;
                i += 1;
            }
            "-n" => {
                let parsed = args.get(i + 1).and_then(|v| v.parse::<usize>().ok());
                match parsed {
                    Some(n) if n > 0 => limit = Some(n),
                    _ => {
                        eprintln!("Error: -n requires a positive integer argument");
                        return ExitCode::from(EXIT_USAGE);
                    }
                }
                i += 2;
            }
            flag => {
                eprintln!("Error: unknown flag {flag}");
                return ExitCode::from(EXIT_USAGE);
            }
        }
    }

    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.log_entries(limit) {
        Ok(entries) => {
            for commit in &entries {
                if oneline {
                    println!("{}", log::format_commit_oneline(commit));
                } else {
                    println!("{}", log::format_commit(commit));
                }
            }
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_shortlog() -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.shortlog() {
        Ok(groups) => {
            for (author, messages) in groups {
                println!("{author} ({}):", messages.len());
                for message in messages {
                    println!("\t{message}");
                }
                println!();
            }
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_branch(args: &[String]) -> ExitCode {
    let branch_usage = "kitkat branch [-l | -r <new-name> | -m <new-name> | -d <branch-name> | <name>]";
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    match args.first().map(String::as_str) {
        None => usage(branch_usage),
        Some("-l") => match repo.list_branches() {
            Ok((branches, current)) => {
                for name in branches {
                    if Some(&name) == current.as_ref() {
                        println!("* {name}");
                    } else {
                        println!("  {name}");
                    }
                }
                ExitCode::from(EXIT_OK)
            }
            Err(e) => fail(&e),
        },
        Some("-r") | Some("-m") | Some("--move") => {
            let Some(new_name) = args.get(1) else {
                return usage("kitkat branch -m <new-name>");
            };
            match repo.rename_current_branch(new_name) {
                Ok(()) => {
                    println!("Branch renamed to {new_name}");
                    ExitCode::from(EXIT_OK)
                }
                Err(e) => fail(&e),
            }
        }
        Some("-d") | Some("--delete") => {
            let Some(name) = args.get(1) else {
                return usage("kitkat branch -d <branch-name>");
            };
            match repo.delete_branch(name) {
                Ok(()) => {
                    println!("Branch `{name}` deleted successfully");
                    ExitCode::from(EXIT_OK)
                }
                Err(e) => fail(&e),
            }
        }
        Some(name) => match repo.create_branch(name) {
            Ok(()) => ExitCode::from(EXIT_OK),
            Err(e) => fail(&e),
        },
    }
}

fn cmd_checkout(args: &[String]) -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    match args {
        [] => usage("kitkat checkout [-b] <branch-name> | <file-path> | <commit>"),
        [flag, name] if flag == "-b" => match repo.checkout_new_branch(name) {
            Ok(()) => {
                println!("Switched to a new branch '{name}'");
                ExitCode::from(EXIT_OK)
            }
            Err(e) => fail(&e),
        },
        [target] => {
            // A branch name wins. A hex string that resolves to a commit
            // detaches HEAD. Anything else is treated as a file path.
            let result = if repo.is_branch(target) {
                repo.checkout_branch(target).map(|()| {
                    println!("Switched to branch '{target}'");
                })
            } else if looks_like_commit(target) && repo.resolves_to_commit(target) {
                repo.checkout_commit(target).map(|()| {
                    println!("HEAD is now detached at {target}");
                })
            } else {
                repo.checkout_file(target)
            };
            match result {
                Ok(()) => ExitCode::from(EXIT_OK),
                Err(e) => fail(&e),
            }
        }
        _ => usage("kitkat checkout [-b] <branch-name> | <file-path> | <commit>"),
    }
}

/// Heuristic for checkout targets: at least four hex chars and nothing else.
fn looks_like_commit(target: &str) -> bool {
    target.len() >= 4
        && target.len() <= 40
        && target.chars().all(|c| c.is_ascii_hexdigit())
}

fn cmd_merge(args: &[String]) -> ExitCode {
    let [branch] = args else {
        return usage("kitkat merge <branch-name>");
    };
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.merge(branch) {
        Ok(MergeOutcome::FastForward { from, to }) => {
            println!("Updating {}..{}", from.short(), to.short());
            println!("Fast-forward");
            ExitCode::from(EXIT_OK)
        }
        Ok(MergeOutcome::AlreadyUpToDate) => {
            println!("Already up to date.");
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_reset(args: &[String]) -> ExitCode {
    let [flag, commit] = args else {
        return usage("kitkat reset --hard <commit-hash>");
    };
    if flag != "--hard" {
        eprintln!("Error: only 'reset --hard' is currently supported");
        return usage("kitkat reset --hard <commit-hash>");
    }
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.reset_hard(commit) {
        Ok(target) => {
            println!("HEAD is now at {} {}", target.id.short(), target.message);
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_tag(args: &[String]) -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    match args {
        [flag] if flag == "--list" => match repo.list_tags() {
            Ok(tags) => {
                for tag in tags {
                    println!("{tag}");
                }
                ExitCode::from(EXIT_OK)
            }
            Err(e) => fail(&e),
        },
        [name, commit] => match repo.create_tag(name, commit) {
            Ok(()) => ExitCode::from(EXIT_OK),
            Err(e) => fail(&e),
        },
        _ => usage("kitkat tag [--list | <tag-name> <commit-id>]"),
    }
}

fn cmd_ls_files() -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.ls_files() {
        Ok(paths) => {
            for path in paths {
                println!("{path}");
            }
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_clean(args: &[String]) -> ExitCode {
    let mut force = false;
    let mut include_ignored = false;
    for arg in args {
        match arg.as_str() {
            "-f" => force = true,
            "-x" => include_ignored = true,
            _ => return usage("kitkat clean [-f] [-x]"),
        }
    }

    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.clean(force, include_ignored) {
        Ok(cleaned) => {
            for file in cleaned {
                match (force, file.ignored) {
                    (true, _) => println!("Removing {}", file.path),
                    (false, true) => println!("Would remove (ignored) {}", file.path),
                    (false, false) => println!("Would remove {}", file.path),
                }
            }
            if !force {
                println!("Run 'kitkat clean -f' to actually remove these files.");
            }
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_config(args: &[String]) -> ExitCode {
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };

    // `config --list` is accepted with or without --global.
    let rest = match args.first().map(String::as_str) {
        Some("--global") => &args[1..],
        Some("--list") => args,
        _ => return usage("kitkat config --global [--list | <key> [<value>]]"),
    };

    match rest {
        [flag] if flag == "--list" => match repo.config().entries() {
            Ok(entries) => {
                for (key, value) in entries {
                    println!("{key}={value}");
                }
                ExitCode::from(EXIT_OK)
            }
            Err(e) => fail(&e),
        },
        [key] => match repo.config().get(key) {
            Ok(Some(value)) => {
                println!("{value}");
                ExitCode::from(EXIT_OK)
            }
            Ok(None) => ExitCode::from(EXIT_FAILURE),
            Err(e) => fail(&e),
        },
        [key, value] => match repo.config().set(key, value) {
            Ok(()) => ExitCode::from(EXIT_OK),
            Err(e) => fail(&e),
        },
        _ => usage("kitkat config --global [--list | <key> [<value>]]"),
    }
}

fn cmd_show_object(args: &[String]) -> ExitCode {
    let [hash] = args else {
        return usage("kitkat show-object <hash>");
    };
    let repo = match open_repo() {
        Ok(repo) => repo,
        Err(code) => return code,
    };
    match repo.show_object(hash) {
        Ok(bytes) => {
            println!("{}", String::from_utf8_lossy(&bytes));
            ExitCode::from(EXIT_OK)
        }
        Err(e) => fail(&e),
    }
}

fn cmd_help(args: &[String]) -> ExitCode {
    match args.first() {
        Some(command) => print_command_help(command),
        None => print_general_help(),
    }
    ExitCode::from(EXIT_OK)
}

fn print_general_help() {
    println!("kitkat - a content-addressed version control system");
    println!();
    println!("Usage: kitkat <command> [args]");
    println!();
    println!("Commands:");
    for (name, blurb) in COMMAND_HELP {
        println!("  {name:<14} {blurb}");
    }
    println!();
    println!("Run 'kitkat help <command>' for command usage.");
}

const COMMAND_HELP: &[(&str, &str)] = &[
    ("init", "create an empty repository in the current directory"),
    ("add", "stage file contents (use -A for all changes)"),
    ("rm", "remove a file from the index and the working tree"),
    ("mv", "move or rename a tracked file"),
    ("commit", "record the staged snapshot (-m, -am, --amend)"),
    ("status", "show staged, unstaged, and untracked changes"),
    ("diff", "show unstaged changes (--staged for index vs HEAD)"),
    ("log", "show commit history (--oneline, -n <count>)"),
    ("shortlog", "show commits grouped by author"),
    ("branch", "list, create, rename, or delete branches"),
    ("checkout", "switch branches or restore files (-b to create)"),
    ("merge", "fast-forward the current branch onto another"),
    ("reset", "reset --hard: move HEAD and discard changes"),
    ("tag", "create or list tags"),
    ("ls-files", "list tracked files"),
    ("clean", "delete untracked files (-f to force, -x for ignored)"),
    ("config", "get and set configuration (--global)"),
    ("show-object", "print a raw object from the store"),
    ("help", "show this help or a command's usage"),
];

fn print_command_help(command: &str) {
    let usage_line = match command {
        "init" => "kitkat init",
        "add" => "kitkat add [-A | --all] <file-path>...",
        "rm" => "kitkat rm <file>",
        "mv" => "kitkat mv [-f|--force] <old_path> <new_path>",
        "commit" => "kitkat commit <-m | -am | --amend -m> <message>",
        "status" => "kitkat status",
        "diff" => "kitkat diff [--cached|--staged]",
        "log" => "kitkat log [--oneline] [-n <count>]",
        "shortlog" => "kitkat shortlog",
        "branch" => "kitkat branch [-l | -m <new-name> | -d <branch-name> | <name>]",
        "checkout" => "kitkat checkout [-b] <branch-name> | <file-path> | <commit>",
        "merge" => "kitkat merge <branch-name>",
        "reset" => "kitkat reset --hard <commit-hash>",
        "tag" => "kitkat tag [--list | <tag-name> <commit-id>]",
        "ls-files" => "kitkat ls-files",
        "clean" => "kitkat clean [-f] [-x]",
        "config" => "kitkat config --global [--list | <key> [<value>]]",
        "show-object" => "kitkat show-object <hash>",
        "help" => "kitkat help [command]",
        _ => {
            println!("Unknown command: {command}");
            return;
        }
    };
    println!("Usage: {usage_line}");
}
