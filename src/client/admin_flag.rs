use anyhow::Result;
use limitter::client::admin_ops;
use limitter::services::RedisTransactionStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let user_id = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("USER_ID").ok());

    println!("Limitter Admin Flag Tool");
    println!("========================");
    println!();
    println!("This tool never writes the flag. Admin access is granted only by");
    println!("editing the user document directly in the store.");
    println!();

    let Some(user_id) = user_id else {
        println!("Usage: admin-flag <user-id>   (or set USER_ID)");
        println!();
        println!("{}", admin_ops::grant_instructions("<user-id>"));
        return Ok(());
    };

    println!("{}", admin_ops::grant_instructions(&user_id));

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let store = RedisTransactionStore::new(&redis_url).await?;

    match admin_ops::report_admin_flag(&store, &user_id).await? {
        Some(true) => println!("[OK] {} currently has is_admin = true", user_id),
        Some(false) => println!("[--] {} currently has is_admin = false", user_id),
        None => println!("[??] No user document found for {}", user_id),
    }

    Ok(())
}
