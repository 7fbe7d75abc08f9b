//! # xtask
//!
//! 开包演出工程的本地门禁。
//!
//! - `check-all`: fmt、clippy、pack-runtime 测试，最后检查 `configs/` 下的演出配置
//! - `config-check [path]`: 只检查配置文件
//! - `smoke`: 用 pack-cli 无窗口跑一遍完整演出

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use pack_runtime::PackConfig;
use walkdir::WalkDir;

/// 默认配置目录（相对于 workspace root）
const CONFIGS_DIR: &str = "configs";

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            cargo(
                "clippy",
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            )?;
            cargo("pack-runtime tests", &["test", "-p", "pack-runtime"])?;
            config_check(Path::new(CONFIGS_DIR))?;
        }
        "config-check" => {
            let path = args.next().map(PathBuf::from);
            config_check(path.as_deref().unwrap_or(Path::new(CONFIGS_DIR)))?;
        }
        "smoke" => {
            // 每份配置各跑一遍，任何一段演出卡死都会让 pack-cli 失败
            for file in collect_config_files(Path::new(CONFIGS_DIR)) {
                let path = file.display().to_string();
                cargo(
                    &format!("smoke {path}"),
                    &["run", "-q", "-p", "pack-cli", "--", "--config", &path, "--json"],
                )?;
            }
        }
        "help" | "-h" | "--help" => print_help(),
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开包演出工程门禁

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all            fmt、clippy、pack-runtime 测试、配置检查
  config-check [path]  检查演出配置（默认 configs/，可指定文件或目录）
  smoke                用 configs/ 下每份配置无窗口跑一遍 pack-cli

CONFIG-CHECK:
  JSON 语法与字段类型，时长非负，帧长上限为正，比例系数在 [0, 1] 内
"#
    );
}

/// 加载并校验每个配置文件
fn config_check(root: &Path) -> anyhow::Result<()> {
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
            root.display()
        );
    }

    let files = collect_config_files(root);
    if files.is_empty() {
        eprintln!("未找到配置文件（.json）");
        return Ok(());
    }

    eprintln!("\n==> 检查 {} 个配置文件", files.len());
    let mut failures = 0;
    for file in &files {
        match PackConfig::load(file) {
            Ok(config) => eprintln!("[OK] {} (seed {})", file.display(), config.seed),
            Err(e) => {
                eprintln!("[ERROR] {}: {}", file.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} / {} 个配置文件有错误", files.len());
    }
    Ok(())
}

/// 收集 `.json` 文件，单个文件直接返回
fn collect_config_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}
