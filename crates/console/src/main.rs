use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use catalog_admin::audit::{AuditAction, AuditFilterChange, AuditLog};
use catalog_admin::navigation::{require_admin, Route};
use catalog_admin::notify::ToastKind;
use catalog_admin::pagination::Pagination;
use catalog_admin::prelude::*;
use catalog_admin::upload::ImageFile;
use catalog_admin::users::role_counts;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "catalog-console", version)]
#[clap(about = "Administer the product catalog from a terminal", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// API base URL. Falls back to CATALOG_API_URL, then http://localhost:3001/api.
    #[clap(long)]
    api_url: Option<String>,

    /// Print raw JSON instead of tables
    #[clap(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Create an account and log in with it
    Signup {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        /// admin or user
        #[clap(long)]
        role: Option<Role>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the logged-in user as the server sees it
    Whoami,
    /// Browse and edit products
    #[clap(subcommand)]
    Products(ProductCommand),
    /// Upload or remove product images
    #[clap(subcommand)]
    Image(ImageCommand),
    /// List users (admin only)
    Users,
    /// Browse the audit log (admin only)
    Audit(AuditArgs),
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    /// One page of the product list
    List(ListArgs),
    Show {
        id: i64,
    },
    Create(ProductFields),
    /// Change a product; fields left out keep their current value
    Update {
        id: i64,
        #[clap(flatten)]
        fields: UpdateFields,
    },
    /// Soft delete
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
    Restore {
        id: i64,
        /// Skip the confirmation prompt
        #[clap(long)]
        yes: bool,
    },
    /// Soft-deleted products
    Deleted,
    /// Search products by name
    Search {
        name: String,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[clap(long)]
    search: Option<String>,
    /// name, price or created_at
    #[clap(long, default_value = "created_at")]
    sort_by: SortBy,
    /// asc or desc
    #[clap(long, default_value = "desc")]
    order: SortOrder,
    #[clap(long, default_value = "1")]
    page: u32,
    #[clap(long, default_value = "10")]
    limit: u32,
    #[clap(long)]
    include_deleted: bool,
}

#[derive(Args, Debug)]
struct ProductFields {
    #[clap(long)]
    name: String,
    #[clap(long)]
    price: f64,
    #[clap(long)]
    description: String,
    #[clap(long)]
    image_url: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateFields {
    #[clap(long)]
    name: Option<String>,
    #[clap(long)]
    price: Option<f64>,
    #[clap(long)]
    description: Option<String>,
    /// Pass an empty string to drop the image
    #[clap(long)]
    image_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ImageCommand {
    /// Upload an image file and print its URL
    Upload { path: PathBuf },
    /// Upload an image file and attach it to a product
    Attach { id: i64, path: PathBuf },
    /// Remove the image of a product
    Remove { id: i64 },
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// CREATE, UPDATE, DELETE or RESTORE
    #[clap(long)]
    action: Option<AuditAction>,
    #[clap(long)]
    user: Option<String>,
    #[clap(long)]
    product_id: Option<i64>,
    /// YYYY-MM-DD
    #[clap(long)]
    from: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[clap(long)]
    to: Option<NaiveDate>,
    #[clap(long, default_value = "1")]
    page: u32,
    #[clap(long, default_value = "20")]
    limit: u32,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let admin = match connect(cli.api_url.as_deref()) {
        Ok(admin) => admin,
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(2);
        }
    };

    let result = run(&admin, cli.command, cli.json).await;
    if let Err(ref e) = result {
        match e.downcast_ref::<Error>() {
            Some(err) => {
                admin.toasts.report(err);
            }
            None => {
                admin.toasts.error(format!("{:#}", e));
            }
        }
    }
    print_toasts(&admin);

    if result.is_err() {
        std::process::exit(1);
    }
}

fn connect(api_url: Option<&str>) -> anyhow::Result<CatalogAdmin> {
    let mut config = AdminConfig::from_env().context("invalid configuration")?;
    if let Some(url) = api_url {
        let options = config.options.clone();
        let session_path = config.session_path.clone();
        config = AdminConfig::new(url)?
            .with_session_path(session_path)
            .with_options(options);
    }
    debug!(api_url = %config.api_url, "using API");
    Ok(CatalogAdmin::new(config)?)
}

/// Restore the session and check it may open `route`
fn enter(admin: &CatalogAdmin, route: Route) -> anyhow::Result<Option<User>> {
    let landed = admin.start(route);
    if landed == Route::Login && route != Route::Login {
        bail!("Please log in first: catalog-console login --email <EMAIL> --password <PASSWORD>");
    }
    if landed != route {
        return Err(Error::forbidden(format!("Only admins can open {}", route)).into());
    }
    Ok(admin.auth.user())
}

async fn run(admin: &CatalogAdmin, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            admin.start(Route::Login);
            let user = admin.auth.login(&email, &password).await?;
            admin.toasts.success(format!("Logged in as {} ({})", user.email, user.role));
        }
        Commands::Signup {
            email,
            password,
            role,
        } => {
            admin.start(Route::Login);
            let user = admin.auth.signup(&email, &password, role).await?;
            admin.toasts.success(format!("Account created for {} ({})", user.email, user.role));
        }
        Commands::Logout => {
            admin.auth.initialize();
            admin.auth.logout().await;
            admin.toasts.info("Logged out");
        }
        Commands::Whoami => {
            enter(admin, Route::Dashboard)?;
            let user = admin
                .auth
                .refresh_current_user()
                .await?
                .context("no stored session")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("{} <{}> role={}", user.id, user.email, user.role);
                if let Some(expires) = admin.auth.token_claims().and_then(|c| c.expires_at()) {
                    println!("token expires {}", expires.to_rfc3339());
                }
            }
        }
        Commands::Products(cmd) => products(admin, cmd, json).await?,
        Commands::Image(cmd) => image(admin, cmd, json).await?,
        Commands::Users => {
            enter(admin, Route::Users)?;
            let users = admin.users.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                for user in &users {
                    println!(
                        "{:>5}  {:<32} {:<6} {}",
                        user.id,
                        user.email,
                        user.role.as_str(),
                        user.created_at.format("%Y-%m-%d")
                    );
                }
                let (admins, regular) = role_counts(&users);
                println!("{} users, {} admins, {} regular", users.len(), admins, regular);
            }
        }
        Commands::Audit(args) => audit(admin, args, json).await?,
    }
    Ok(())
}

async fn products(admin: &CatalogAdmin, cmd: ProductCommand, json: bool) -> anyhow::Result<()> {
    let user = enter(admin, Route::Products)?;
    let store = &admin.products;

    match cmd {
        ProductCommand::List(args) => {
            let mut change = FilterChange::new()
                .with_sort(args.sort_by, args.order)
                .with_limit(args.limit)
                .with_include_deleted(args.include_deleted);
            if let Some(search) = args.search {
                change = change.with_search(search);
            }
            store.set_filters(change).await;
            store.go_to_page(args.page).await;
            let state = store.snapshot().await;
            if let Some(error) = state.error {
                bail!(error);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&state.products)?);
            } else {
                print_products(&state.products);
                print_pagination(&state.pagination);
            }
        }
        ProductCommand::Show { id } => {
            let product = admin.api.get_product(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&product)?);
            } else {
                print_product(&product);
            }
        }
        ProductCommand::Create(fields) => {
            require_admin(user.as_ref(), "create products")?;
            let form = ProductForm {
                name: fields.name,
                price: fields.price,
                description: fields.description,
                image_url: fields.image_url.unwrap_or_default(),
            };
            let product = store.create_product(&form).await?;
            admin.toasts.success("Product created successfully");
            print_product(&product);
        }
        ProductCommand::Update { id, fields } => {
            require_admin(user.as_ref(), "update products")?;
            let current = admin.api.get_product(id).await?;
            let mut form = ProductForm::from_product(&current);
            if let Some(name) = fields.name {
                form.name = name;
            }
            if let Some(price) = fields.price {
                form.price = price;
            }
            if let Some(description) = fields.description {
                form.description = description;
            }
            if let Some(image_url) = fields.image_url {
                form.image_url = image_url;
            }
            let product = store.update_product(id, &form).await?;
            admin.toasts.success("Product updated successfully");
            print_product(&product);
        }
        ProductCommand::Delete { id, yes } => {
            require_admin(user.as_ref(), "delete products")?;
            confirm("Are you sure you want to delete this product?", yes)?;
            store.delete_product(id).await?;
            admin.toasts.success("Product deleted successfully");
        }
        ProductCommand::Restore { id, yes } => {
            require_admin(user.as_ref(), "restore products")?;
            confirm("Are you sure you want to restore this product?", yes)?;
            store.restore_product(id).await?;
            admin.toasts.success("Product restored successfully");
        }
        ProductCommand::Deleted => {
            require_admin(user.as_ref(), "view deleted products")?;
            store.deleted_products().await;
            print_store_list(admin, json).await?;
        }
        ProductCommand::Search { name } => {
            require_admin(user.as_ref(), "search products")?;
            store.search_products(&name).await;
            print_store_list(admin, json).await?;
        }
    }
    Ok(())
}

async fn image(admin: &CatalogAdmin, cmd: ImageCommand, json: bool) -> anyhow::Result<()> {
    let user = enter(admin, Route::Products)?;
    require_admin(user.as_ref(), "manage product images")?;

    match cmd {
        ImageCommand::Upload { path } => {
            let file = ImageFile::from_path(&path).await?;
            let uploaded = admin.api.upload_image(file).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&uploaded)?);
            } else {
                println!("{}", uploaded.url);
            }
            admin.toasts.success("Image uploaded successfully");
        }
        ImageCommand::Attach { id, path } => {
            let file = ImageFile::from_path(&path).await?;
            let product = admin.products.upload_image(id, file).await?;
            admin.toasts.success("Image uploaded successfully");
            print_product(&product);
        }
        ImageCommand::Remove { id } => {
            let product = admin.products.remove_image(id).await?;
            admin.toasts.success("Image removed successfully");
            print_product(&product);
        }
    }
    Ok(())
}

async fn audit(admin: &CatalogAdmin, args: AuditArgs, json: bool) -> anyhow::Result<()> {
    enter(admin, Route::Audit)?;
    let view = &admin.audit;

    view.set_filter(AuditFilterChange {
        action: Some(args.action),
        user_email: Some(args.user),
        product_id: Some(args.product_id),
        start_date: Some(args.from),
        end_date: Some(args.to),
        limit: Some(args.limit),
    })
    .await;
    view.go_to_page(args.page).await;
    view.fetch().await;

    let state = view.snapshot().await;
    if let Some(error) = state.error {
        bail!(error);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&state.logs)?);
    } else {
        for log in &state.logs {
            print_audit_log(log);
        }
        print_pagination(&state.pagination);
    }
    Ok(())
}

/// Ask before a destructive action. Without a terminal the action needs `--yes`.
fn confirm(prompt: &str, yes: bool) -> anyhow::Result<()> {
    if yes {
        return Ok(());
    }
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        bail!("{prompt} Pass --yes to confirm.");
    }

    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    if !is_affirmative(&answer) {
        bail!("Cancelled");
    }
    Ok(())
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn print_store_list(admin: &CatalogAdmin, json: bool) -> anyhow::Result<()> {
    let state = admin.products.snapshot().await;
    if let Some(error) = state.error {
        bail!(error);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&state.products)?);
    } else {
        print_products(&state.products);
    }
    Ok(())
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for p in products {
        let deleted = if p.is_deleted { " [deleted]" } else { "" };
        println!("{:>5}  {:<32} {:>10.2}  {}{}", p.id, p.name, p.price, p.creator_email, deleted);
    }
}

fn print_product(p: &Product) {
    println!("#{} {}", p.id, p.name);
    println!("  price:       {:.2}", p.price);
    if let Some(ref description) = p.description {
        println!("  description: {}", description);
    }
    if let Some(ref url) = p.image_url {
        println!("  image:       {}", url);
    }
    println!("  created by:  {}", p.creator_email);
    println!("  updated:     {}", p.updated_at.to_rfc3339());
    if p.is_deleted {
        println!("  (deleted)");
    }
}

fn print_pagination(pagination: &Pagination) {
    println!(
        "{} (page {} of {})",
        pagination.summary(),
        pagination.page,
        pagination.total_pages.max(1)
    );
}

fn print_audit_log(log: &AuditLog) {
    let product = match (log.product_id, log.product_name.as_deref()) {
        (Some(id), Some(name)) => format!("#{} {}", id, name),
        (Some(id), None) => format!("#{}", id),
        _ => "-".to_string(),
    };
    println!(
        "{}  {:<8} {:<28} {}",
        log.timestamp.format("%Y-%m-%d %H:%M:%S"),
        log.action.as_str(),
        log.user_email,
        product
    );
    if let Some(details) = log.details_text() {
        println!("    {}", details);
    }
}

fn print_toasts(admin: &CatalogAdmin) {
    for toast in admin.toasts.drain() {
        match toast.kind {
            ToastKind::Error | ToastKind::Warning => eprintln!("{}: {}", toast.kind, toast.message),
            _ => println!("{}: {}", toast.kind, toast.message),
        }
    }
}
