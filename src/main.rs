use socialgraph::logger::*;
use socialgraph::server::*;
use socialgraph::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap()?;

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let server = Server::try_new(&project_settings)?;
    let retry = server.retry_policy();

    let alice = server.open_session();
    let bob = server.open_session();

    let alice_user = alice
        .sign_up("alice@example.com", "alice-secret", "Alice")
        .await
        .into_result()
        .map_err(|e| anyhow::anyhow!("alice sign-up failed: {e}"))?;
    let bob_user = bob
        .sign_up("bob@example.com", "bob-secret", "Bob")
        .await
        .into_result()
        .map_err(|e| anyhow::anyhow!("bob sign-up failed: {e}"))?;
    info!(alice = %alice_user.uid, bob = %bob_user.uid, "accounts ready");

    let mut feed = retry
        .run(|| async { bob.subscribe_feed().await.into_result() })
        .await
        .map_err(anyhow::Error::msg)?;
    if let Some(posts) = feed.next().await {
        info!(count = posts.len(), "initial feed");
    }

    let post = alice
        .create_post("Hello from Alice")
        .await
        .into_result()
        .map_err(anyhow::Error::msg)?;
    if let Some(posts) = feed.next().await {
        info!(count = posts.len(), newest = ?posts.first().map(|p| &p.text), "feed updated");
    }

    let liked = bob.toggle_like(&post.id).await;
    info!(?liked, "bob toggled like");
    let comment = bob.add_comment(&post.id, "Welcome!").await;
    info!(?comment, "bob commented");
    let saved = bob.toggle_save(&post.id).await;
    info!(?saved, "bob toggled save");

    let request = bob.send_friend_request(alice_user.uid).await;
    info!(?request, "bob sent friend request");
    let pending = alice.pending_requests().await;
    info!(?pending, "alice pending requests");
    let accepted = alice.accept_friend_request(bob_user.uid).await;
    info!(?accepted, "alice accepted");
    let status = bob.friendship_status(alice_user.uid).await;
    info!(?status, "bob sees");
    let friends = alice.friends_list().await;
    info!(
        friends = ?friends.data.as_ref().map(|f| f.iter().map(|u| u.display_name.clone()).collect::<Vec<_>>()),
        "alice friends"
    );

    let mut latest = None;
    while let Some(posts) = feed.try_next() {
        latest = Some(posts);
    }
    if let Some(posts) = latest {
        info!(posts = ?posts.iter().map(|p| (p.likes_count, p.comments_count)).collect::<Vec<_>>(), "latest counts");
    }
    feed.cancel();

    server.shutdown();

    Ok(())
}
