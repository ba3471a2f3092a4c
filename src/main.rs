//!
//! pantry CLI
//! ----------
//! Command-line front end for the pantry backend. Credentials and the active group
//! are kept as JSON files under a state directory, so a login survives between runs
//! and later commands refresh the access token silently.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use pantry_client::models::{LoginModel, RegisterModel};
use pantry_client::services::DEFAULT_PAGE_SIZE;
use pantry_client::{ApiClient, ClientConfig, JsonFileStore};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--config <file>] [--state-dir <dir>] <command> [args]\n\nCommands:\n  login (--email <e> | --phone <p>) --password <pw>   sign in and store the token pair\n  register [--name <n>] (--email <e> | --phone <p>) --password <pw>\n  whoami                                               show identity claims and active group\n  status                                               check the stored session (refreshes if expired)\n  products [--search <text>] [--page <n>]              list products of the active group\n  recipes [--search <text>] [--page <n>]               list recipes of the active group\n  recipe <id>                                          show one recipe\n  cook <id>                                            mark a recipe as cooked\n  group <id>                                           switch the active group\n  logout                                               forget tokens and active group\n\nFlags:\n  --config <file>      JSON config with ApiUrl / ImageStorageUrl (default: PANTRY_API_URL env)\n  --state-dir <dir>    where secrets.json and preferences.json live (default: ~/.pantry)\n  -h, --help           show this help\n\nEnvironment:\n  PANTRY_API_URL, PANTRY_IMAGE_STORAGE_URL, PANTRY_REQUEST_TIMEOUT_SECS, RUST_LOG"
    );
}

fn default_state_dir() -> PathBuf {
    let home = env::var("HOME").or_else(|_| env::var("USERPROFILE")).unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pantry")
}

/// Pull `--flag value` out of `args`, if present.
fn take_flag(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == flag) else { return Ok(None); };
    if pos + 1 >= args.len() {
        return Err(anyhow!("{} requires a value", flag));
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn page_arg(args: &mut Vec<String>) -> Result<u32> {
    match take_flag(args, "--page")? {
        Some(p) => p.parse::<u32>().with_context(|| format!("invalid page '{}'", p)),
        None => Ok(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage(&program);
        return Ok(());
    }

    let config = match take_flag(&mut args, "--config")? {
        Some(path) => ClientConfig::load(&PathBuf::from(path))?,
        None => ClientConfig::from_env().context("set PANTRY_API_URL or pass --config")?,
    };
    let state_dir = take_flag(&mut args, "--state-dir")?.map(PathBuf::from).unwrap_or_else(default_state_dir);
    let secrets = Arc::new(JsonFileStore::new(state_dir.join("secrets.json")));
    let preferences = Arc::new(JsonFileStore::new(state_dir.join("preferences.json")));
    let api = ApiClient::new(config, secrets, preferences)?;

    if args.is_empty() {
        print_usage(&program);
        std::process::exit(2);
    }
    let command = args.remove(0);
    match command.as_str() {
        "login" => {
            let email = take_flag(&mut args, "--email")?;
            let phone = take_flag(&mut args, "--phone")?;
            let password = take_flag(&mut args, "--password")?.ok_or_else(|| anyhow!("--password is required"))?;
            if email.is_none() && phone.is_none() {
                return Err(anyhow!("login needs --email or --phone"));
            }
            let confirmed = api.login(&LoginModel { email, phone, password }).await?;
            report_login(&api, confirmed);
        }
        "register" => {
            let name = take_flag(&mut args, "--name")?;
            let email = take_flag(&mut args, "--email")?;
            let phone = take_flag(&mut args, "--phone")?;
            let password = take_flag(&mut args, "--password")?.ok_or_else(|| anyhow!("--password is required"))?;
            let confirmed = api.register(&RegisterModel { name, email, phone, password }).await?;
            report_login(&api, confirmed);
        }
        "whoami" => {
            let state = api.session().ensure_valid_token().await;
            let claims = api.session().claims();
            println!("state:  {:?}", state);
            println!("id:     {}", claims.id.as_deref().unwrap_or("-"));
            println!("name:   {}", claims.name.as_deref().unwrap_or("-"));
            println!("email:  {}", claims.email.as_deref().unwrap_or("-"));
            println!("phone:  {}", claims.phone.as_deref().unwrap_or("-"));
            println!("roles:  {}", claims.roles.join(", "));
            println!("group:  {}", api.session().group_id().as_deref().unwrap_or("-"));
        }
        "status" => {
            if api.check_authentication().await {
                println!("authenticated (group: {})", api.session().group_id().as_deref().unwrap_or("none"));
            } else {
                println!("not authenticated ({:?}); run `{} login`", api.session().state(), program);
            }
        }
        "products" => {
            let search = take_flag(&mut args, "--search")?.unwrap_or_default();
            let page = page_arg(&mut args)?;
            let group = active_group(&api).await?;
            let list = api.products().get_products_page(&group, page, DEFAULT_PAGE_SIZE, &search).await?;
            for p in &list.items {
                println!("{:>5}  {}  ({})", p.count, p.name, p.id);
            }
            println!("page {}/{}", page, list.total_pages);
        }
        "recipes" => {
            let search = take_flag(&mut args, "--search")?.unwrap_or_default();
            let page = page_arg(&mut args)?;
            let group = active_group(&api).await?;
            let list = api.recipes().get_recipes_page(&group, page, DEFAULT_PAGE_SIZE, &search).await?;
            for r in &list.items {
                println!("{}  ({})", r.name, r.id);
            }
            println!("page {}/{}", page, list.total_pages);
        }
        "recipe" => {
            let id = args.first().cloned().ok_or_else(|| anyhow!("recipe needs an id"))?;
            let recipe = api.recipes().get_recipe(&id).await?;
            println!("{}", recipe.name);
            if let Some(thumb) = &recipe.thumbnail {
                println!("image: {}", api.image_url(thumb));
            }
            let categories: Vec<&str> = recipe.categories.iter().map(|c| c.name.as_str()).collect();
            if !categories.is_empty() {
                println!("categories: {}", categories.join(", "));
            }
            println!("ingredients:");
            for i in &recipe.ingredients {
                println!("  {} x{}", i.name, i.count);
            }
            println!("\n{}", recipe.text);
        }
        "cook" => {
            let id = args.first().cloned().ok_or_else(|| anyhow!("cook needs an id"))?;
            api.recipes().cook_recipe(&id).await?;
            println!("cooked {}", id);
        }
        "group" => {
            let id = args.first().cloned().ok_or_else(|| anyhow!("group needs an id"))?;
            api.session().set_group_id(Some(id.as_str()))?;
            println!("active group: {}", id);
        }
        "logout" => {
            api.logout()?;
            println!("logged out");
        }
        other => {
            eprintln!("unknown command '{}'", other);
            print_usage(&program);
            std::process::exit(2);
        }
    }
    Ok(())
}

fn report_login(api: &ApiClient, confirmed: bool) {
    let claims = api.session().claims();
    println!("signed in as {}", claims.name.as_deref().or(claims.lookup_identifier()).unwrap_or("?"));
    if !confirmed {
        println!("warning: profile could not be loaded; group membership unknown");
    } else if api.session().group_id().is_none() {
        println!("no household group yet; create or join one");
    }
}

async fn active_group(api: &ApiClient) -> Result<String> {
    api.require_session().await.context("run `login` first")?;
    api.session().group_id().ok_or_else(|| anyhow!("no active group; run `group <id>` or `status`"))
}
