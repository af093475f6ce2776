#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    filehash::init_tracing("info");

    filehash_server::rocket().launch().await?;
    Ok(())
}
