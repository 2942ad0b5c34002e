//! The `check` command: verify external tools and the model server.

use console::style;

use scansum::config::AppConfig;
use scansum::llm::OllamaClient;
use scansum::ocr::{check_tools, DocumentOcrEngine, TextRecognizer};

pub async fn cmd_check(config: &AppConfig) -> anyhow::Result<()> {
    let mut ready = true;

    println!("{}", style("OCR tools").bold());
    for (tool, available) in check_tools() {
        if available {
            println!("  {} {}", style("✓").green(), tool);
        } else {
            ready = false;
            println!("  {} {} not found in PATH", style("✗").red(), tool);
        }
    }
    let engine = DocumentOcrEngine::tesseract(&config.ocr);
    if !engine.recognizer().is_available() {
        println!("    {}", style(engine.recognizer().availability_hint()).dim());
    }

    println!("{}", style("Language model").bold());
    let client = OllamaClient::new(&config.ollama)?;
    match client.list_models().await {
        Ok(models) => {
            let model = &config.ollama.model;
            let tagged = format!("{}:latest", model);
            if models.iter().any(|m| m == model || *m == tagged) {
                println!(
                    "  {} {} available at {}",
                    style("✓").green(),
                    model,
                    client.endpoint()
                );
            } else {
                ready = false;
                println!(
                    "  {} {} not pulled on {} (run: ollama pull {})",
                    style("✗").red(),
                    model,
                    client.endpoint(),
                    model
                );
            }
        }
        Err(e) => {
            ready = false;
            println!(
                "  {} Cannot reach {}: {}",
                style("✗").red(),
                client.endpoint(),
                e
            );
        }
    }

    if !ready {
        anyhow::bail!("Environment is not ready");
    }
    println!("{} Ready", style("✓").green());
    Ok(())
}
