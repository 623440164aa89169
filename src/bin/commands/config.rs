use clap::Args;
use metareg::lens::utils::{to_json_value, OutputFormat};
use metareg::{ConnectionProvider, MetadataRepository, MetaregConfig, StoreDriver};
use serde::Serialize;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Also connect to the store and count the registered databases
    #[clap(long)]
    pub check: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    driver: StoreDriver,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    password: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    trust_server_certificate: bool,
    settings_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<StoreCheck>,
}

#[derive(Debug, Serialize)]
struct StoreCheck {
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(config: &MetaregConfig, args: ConfigArgs, output_format: OutputFormat) {
    let ConfigArgs { check } = args;

    let settings = config.store_settings();
    let problem = settings.as_ref().err().map(|e| e.to_string());

    let store_check = match (&settings, check) {
        (Ok(s), true) => {
            let provider = ConnectionProvider::new(s.clone());
            let result = provider.handle().and_then(|store| store.list_all());
            let _ = provider.close();
            Some(match result {
                Ok(records) => StoreCheck {
                    reachable: true,
                    record_count: Some(records.len()),
                    error: None,
                },
                Err(e) => StoreCheck {
                    reachable: false,
                    record_count: None,
                    error: Some(e.to_string()),
                },
            })
        }
        _ => None,
    };

    let info = ConfigInfo {
        config_file: config.config_file.clone(),
        driver: config.driver,
        host: config.host.clone(),
        port: config.port.clone(),
        user: config.user.clone(),
        password: config.password_status(),
        database: config.database.clone(),
        trust_server_certificate: config.trust_server_certificate,
        settings_complete: problem.is_none(),
        problem,
        check: store_check,
    };

    if output_format.is_json() {
        match to_json_value(&info, output_format) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing config info: {}", e),
        }
        return;
    }

    // Table, Markdown, and PSV all use the same human-readable format
    print_config_table(config, &info);
}

fn print_config_table(config: &MetaregConfig, info: &ConfigInfo) {
    println!("Metareg Configuration");
    println!("=====================\n");

    println!("{}", config.summary());
    println!();

    match &info.problem {
        None => println!("Settings:           complete"),
        Some(problem) => println!("Settings:           {}", problem),
    }

    if let Some(check) = &info.check {
        match (&check.record_count, &check.error) {
            (Some(count), _) => println!("Store:              reachable, {} records", count),
            (None, Some(error)) => println!("Store:              unreachable ({})", error),
            (None, None) => println!("Store:              unreachable"),
        }
    }

    eprintln!();
    eprintln!("Tips:");
    eprintln!("  Use --check to test the store connection");
    eprintln!("  Use --output json for machine-readable output");
    eprintln!(
        "  Edit {} or set METAREG_* variables to customize settings",
        MetaregConfig::config_file_path()
    );
}
