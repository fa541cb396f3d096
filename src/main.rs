use clap::Parser;
use photo_report::{cli, config, error, export, prompt, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use export::docx::ReportOptions;
use export::DocxPackage;
use std::path::PathBuf;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Generate { inputs, template, output, pattern, no_recursive, width } => {
            println!("📄 photo-report - 報告書生成\n");

            let template = prompt::resolve_template(template, &config)?;
            let pattern = prompt::resolve_pattern(pattern.as_deref(), &config)?;

            // 1. 画像収集
            println!("[1/3] 写真を収集中...");
            let images = collect_valid(&inputs, !no_recursive, cli.verbose)?;
            println!("✔ {}枚の写真を検出\n", images.len());
            if images.is_empty() {
                eprintln!("⚠ 写真がないため、横向きセクションのみ追加します");
            }

            // 2. 生成
            println!("[2/3] 報告書を生成中... (パターン: \"{}\")", pattern);
            let options = ReportOptions {
                image_width_in: width.unwrap_or(config.image_width_inches),
                show_progress: !cli.verbose,
                verbose: cli.verbose,
            };
            let summary = export::export_report(&images, &pattern, &template, &output, &options)?;

            // 3. 結果
            println!("\n[3/3] 結果");
            println!("  ページ: {}", summary.grids);
            println!("  写真: {}枚", summary.pictures);
            if !summary.placeholders.is_empty() {
                println!("  読み込み失敗: {}枚", summary.placeholders.len());
            }

            println!("\n✅ 報告書を保存しました: {}", summary.output.display());
        }

        Commands::Preview { inputs, pattern, no_recursive, json } => {
            let pattern = prompt::resolve_pattern(pattern.as_deref(), &config)?;
            let images = collect_valid(&inputs, !no_recursive, cli.verbose)?;
            let preview = export::preview_captions(&images, &pattern);

            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                for row in &preview {
                    match (&row.caption, &row.error) {
                        (Some(caption), _) => println!("{}  ←  {}", caption, row.path.display()),
                        (None, Some(err)) => println!("⚠ {}  ({})", row.path.display(), err),
                        (None, None) => println!("{}", row.path.display()),
                    }
                }
                println!("\n{}枚", preview.len());
            }
        }

        Commands::NewTemplate { output } => {
            let output_path = export::resolve_output_path(&output);
            DocxPackage::blank()?.save(&output_path)?;
            println!("✔ テンプレートを作成: {}", output_path.display());
        }

        Commands::Config { set_pattern, set_template, set_width, show } => {
            let mut config = config;
            let changed = set_pattern.is_some() || set_template.is_some() || set_width.is_some();

            if let Some(pattern) = set_pattern {
                config.default_pattern = Some(pattern);
            }
            if let Some(template) = set_template {
                config.default_template = Some(template);
            }
            if let Some(width) = set_width {
                config.set_image_width(width)?;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  命名パターン: {}", config.default_pattern.as_deref().unwrap_or("未設定"));
                println!(
                    "  テンプレート: {}",
                    config
                        .default_template
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  画像幅: {}インチ", config.image_width_inches);
            }
        }
    }

    Ok(())
}

/// 入力から画像を集め、空ファイル・存在しないファイルを除く
fn collect_valid(inputs: &[PathBuf], recursive: bool, verbose: bool) -> Result<Vec<scanner::ImageInfo>> {
    let images = scanner::collect_images(inputs, recursive)?;
    let total = images.len();
    let valid = scanner::filter_valid(images);

    if verbose && valid.len() != total {
        eprintln!("空または読めないファイルを除外: {}件", total - valid.len());
    }

    Ok(valid)
}
