//! Account and session commands.

use anyhow::{Result, bail};
use tasker_ui::render::summary_line;
use tasker_ui::{Gesture, Runtime, Services};

use super::{StdinPrompter, report, signed_in};

pub async fn signup(
    services: Services,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let mut runtime = Runtime::new(services, StdinPrompter::default());
    runtime
        .gesture(Gesture::SignUpSubmitted {
            name,
            email,
            password,
        })
        .await;
    report(runtime.state())?;
    println!("Run `tasker verify <CODE>` with the code from your email.");
    Ok(())
}

pub async fn verify(services: Services, code: String) -> Result<()> {
    let mut runtime = Runtime::new(services, StdinPrompter::default());
    runtime.gesture(Gesture::VerifySubmitted { code }).await;
    report(runtime.state())
}

pub async fn resend(services: Services) -> Result<()> {
    let mut runtime = Runtime::new(services, StdinPrompter::default());
    runtime.gesture(Gesture::ResendClicked).await;
    report(runtime.state())
}

pub async fn login(services: Services, email: String, password: String) -> Result<()> {
    let mut runtime = Runtime::new(services, StdinPrompter::default());
    runtime
        .gesture(Gesture::LoginSubmitted { email, password })
        .await;
    report(runtime.state())?;
    println!("{}", summary_line(runtime.state().tasks.summary()));
    Ok(())
}

pub async fn logout(services: Services, yes: bool) -> Result<()> {
    let mut runtime = Runtime::new(services, StdinPrompter::new(yes));
    runtime.gesture(Gesture::LogoutClicked).await;
    if runtime.state().notice.is_none() {
        println!("Cancelled.");
        return Ok(());
    }
    report(runtime.state())
}

pub async fn whoami(services: Services) -> Result<()> {
    let runtime = signed_in(services, StdinPrompter::default()).await?;
    let Some(user) = &runtime.state().user else {
        bail!("Not logged in. Run `tasker login` first.");
    };
    println!("{} <{}>", user.name, user.email);
    println!("Storage: {}", runtime.services().tasks.mode());
    Ok(())
}
