use clap::Args;
use swiftshop_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "SWIFTSHOP_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    let mut sessions = context.session_store();

    let session = sessions
        .login(&args.email, &args.password)
        .await
        .map_err(|error| format!("login failed: {error}"))?;

    match &session.user {
        Some(user) => println!("signed in as {} <{}>", user.name, user.email),
        None => println!("signed in"),
    }

    Ok(())
}

pub(crate) fn logout(context: &AppContext) -> Result<(), String> {
    context
        .session_store()
        .logout()
        .map_err(|error| format!("logout failed: {error}"))?;

    println!("signed out");

    Ok(())
}

pub(crate) async fn whoami(context: &AppContext) -> Result<(), String> {
    let sessions = super::signed_in(context).await?;
    let session = sessions.session();

    let Some(user) = &session.user else {
        return Err("session has no profile".to_string());
    };

    println!("id: {}", user.id);
    println!("name: {}", user.name);
    println!("email: {}", user.email);
    println!("role: {}", if session.is_admin() { "admin" } else { "client" });

    let address = user.contact.address_line();

    if !address.is_empty() {
        println!("address: {address}");
    }

    Ok(())
}
