//! Trolley Admin CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use trolley::users::UserId;
use trolley_app::{
    auth::PgAuthService,
    database::{self, Db},
    domain::{
        products::{PgProductsService, ProductsService, models::NewProduct},
        users::{PgUsersService, UsersService, models::NewUser},
    },
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "trolley-app", about = "Trolley admin CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, default_value = "")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Manage users
    User(UserCommand),

    /// Manage API tokens
    Token(TokenCommand),

    /// Manage catalog products
    Product(ProductCommand),
}

#[derive(Debug, Args)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create a user and issue their first API token
    Create {
        /// Display name
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Args)]
struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokenSubcommand {
    /// Issue another API token for an existing user
    Create {
        #[arg(long)]
        user_id: i64,
    },

    /// Revoke an API token
    Revoke {
        #[arg(long)]
        token_uuid: Uuid,
    },
}

#[derive(Debug, Args)]
struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Add a product to the catalog
    Create(CreateProductArgs),
}

#[derive(Debug, Args)]
struct CreateProductArgs {
    #[arg(long)]
    name: String,

    /// Unit price, e.g. 12.50
    #[arg(long)]
    price: Decimal,

    #[arg(long)]
    image: Option<String>,

    #[arg(long)]
    out_of_stock: bool,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if cli.database_url.trim().is_empty() {
        return Err("DATABASE_URL is required".to_string());
    }

    let pool = database::connect(&cli.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    match cli.command {
        Commands::Migrate => {
            database::migrate(&pool)
                .await
                .map_err(|error| format!("failed to apply migrations: {error}"))?;

            println!("migrations applied");
        }
        Commands::User(UserCommand {
            command: UserSubcommand::Create { name },
        }) => {
            let user = PgUsersService::new(Db::new(pool.clone()))
                .create_user(NewUser { name })
                .await
                .map_err(|error| format!("failed to create user: {error}"))?;

            println!("user_id: {}", user.id);
            println!("user_name: {}", user.name);

            issue_token(PgAuthService::new(pool), user.id).await?;
        }
        Commands::Token(TokenCommand {
            command: TokenSubcommand::Create { user_id },
        }) => issue_token(PgAuthService::new(pool), UserId::new(user_id)).await?,
        Commands::Token(TokenCommand {
            command: TokenSubcommand::Revoke { token_uuid },
        }) => {
            let revoked = PgAuthService::new(pool)
                .revoke_api_token(token_uuid)
                .await
                .map_err(|error| format!("failed to revoke token: {error}"))?;

            if revoked {
                println!("token {token_uuid} revoked");
            } else {
                println!("token {token_uuid} was not active");
            }
        }
        Commands::Product(ProductCommand {
            command: ProductSubcommand::Create(args),
        }) => {
            let product = PgProductsService::new(Db::new(pool))
                .create_product(NewProduct {
                    name: args.name,
                    price: args.price,
                    image: args.image,
                    in_stock: !args.out_of_stock,
                })
                .await
                .map_err(|error| format!("failed to create product: {error}"))?;

            println!("product_id: {}", product.id);
            println!("product_price: {}", product.price);
        }
    }

    Ok(())
}

async fn issue_token(auth: PgAuthService, user: UserId) -> Result<(), String> {
    let issued = auth
        .issue_api_token(user)
        .await
        .map_err(|error| format!("failed to issue token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("api_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
