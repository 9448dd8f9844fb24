mod common;

use common::Fixture;
use socialgraph::application_port::ServiceError;
use socialgraph::domain_model::*;
use socialgraph::domain_port::DocumentStore;
use socialgraph::domain_port::collections::{FRIEND_REQUESTS, FRIENDS, USERS};

#[tokio::test]
async fn sending_a_request_records_it_on_both_users() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();

    assert!(fx.user(alice).await.sent_requests.contains(&bob));
    assert!(fx.user(bob).await.pending_requests.contains(&alice));
    assert_eq!(fx.store.document_count(FRIEND_REQUESTS), 1);

    let pending = fx.graph.get_pending_requests(bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].sender.uid, alice);
    assert_eq!(pending[0].request.status, RequestStatus::Pending);
}

#[tokio::test]
async fn accept_makes_friendship_symmetric() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();
    fx.graph.accept_friend_request(bob, alice).await.unwrap();

    let a = fx.user(alice).await;
    let b = fx.user(bob).await;
    assert!(a.friends.contains(&bob));
    assert!(b.friends.contains(&alice));
    assert!(a.sent_requests.is_empty());
    assert!(b.pending_requests.is_empty());
    assert_eq!(fx.store.document_count(FRIENDS), 2);

    assert!(fx.graph.get_pending_requests(bob).await.unwrap().is_empty());
    let friends = fx.graph.get_friends_list(alice).await.unwrap();
    assert_eq!(friends.iter().map(|u| u.uid).collect::<Vec<_>>(), vec![bob]);
}

#[tokio::test]
async fn accepting_twice_is_invalid() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();
    fx.graph.accept_friend_request(bob, alice).await.unwrap();

    let again = fx.graph.accept_friend_request(bob, alice).await;
    assert!(matches!(again, Err(ServiceError::InvalidOperation(_))));
    assert_eq!(fx.store.document_count(FRIENDS), 2);
}

#[tokio::test]
async fn accept_without_request_is_not_found() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    let result = fx.graph.accept_friend_request(bob, alice).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(fx.store.document_count(FRIENDS), 0);
}

#[tokio::test]
async fn remove_friend_clears_both_edges_and_allows_new_request() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();
    fx.graph.accept_friend_request(bob, alice).await.unwrap();
    fx.graph.remove_friend(bob, alice).await.unwrap();

    assert_eq!(fx.store.document_count(FRIENDS), 0);
    assert!(fx.user(alice).await.friends.is_empty());
    assert!(fx.user(bob).await.friends.is_empty());
    assert_eq!(
        fx.graph.get_friendship_status(alice, bob).await.unwrap(),
        FriendshipStatus::None
    );

    fx.graph.send_friend_request(bob, alice).await.unwrap();
    assert_eq!(
        fx.graph.get_friendship_status(alice, bob).await.unwrap(),
        FriendshipStatus::RequestReceived
    );
}

#[tokio::test]
async fn removing_a_non_friend_keeps_pending_request_intact() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();
    let result = fx.graph.remove_friend(alice, bob).await;
    assert!(matches!(result, Err(ServiceError::InvalidOperation(_))));

    assert_eq!(fx.store.document_count(FRIEND_REQUESTS), 1);
    assert!(fx.user(bob).await.pending_requests.contains(&alice));
    assert_eq!(fx.graph.get_pending_requests(bob).await.unwrap().len(), 1);
    assert_eq!(
        fx.graph.get_friendship_status(bob, alice).await.unwrap(),
        FriendshipStatus::RequestReceived
    );

    fx.graph.accept_friend_request(bob, alice).await.unwrap();
    assert_eq!(
        fx.graph.get_friendship_status(alice, bob).await.unwrap(),
        FriendshipStatus::Friends
    );
}

#[tokio::test]
async fn second_reject_is_not_found() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();
    fx.graph.reject_friend_request(bob, alice).await.unwrap();

    assert_eq!(fx.store.document_count(FRIEND_REQUESTS), 0);
    assert!(fx.user(alice).await.sent_requests.is_empty());
    assert!(fx.user(bob).await.pending_requests.is_empty());

    let again = fx.graph.reject_friend_request(bob, alice).await;
    assert!(matches!(again, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn duplicate_and_self_requests_are_refused() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    fx.graph.send_friend_request(alice, bob).await.unwrap();
    assert_eq!(
        fx.graph.send_friend_request(alice, bob).await,
        Err(ServiceError::DuplicateRequest)
    );
    assert!(matches!(
        fx.graph.send_friend_request(bob, alice).await,
        Err(ServiceError::InvalidOperation(_))
    ));
    assert!(matches!(
        fx.graph.send_friend_request(alice, alice).await,
        Err(ServiceError::InvalidOperation(_))
    ));
    assert_eq!(fx.store.document_count(FRIEND_REQUESTS), 1);
}

#[tokio::test]
async fn request_to_unknown_user_writes_nothing() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;

    let result = fx.graph.send_friend_request(alice, UserId::generate()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(fx.store.document_count(FRIEND_REQUESTS), 0);
    assert!(fx.user(alice).await.sent_requests.is_empty());
}

#[tokio::test]
async fn status_reports_each_direction() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;

    assert_eq!(
        fx.graph.get_friendship_status(alice, bob).await.unwrap(),
        FriendshipStatus::None
    );
    fx.graph.send_friend_request(alice, bob).await.unwrap();
    assert_eq!(
        fx.graph.get_friendship_status(alice, bob).await.unwrap(),
        FriendshipStatus::RequestSent
    );
    assert_eq!(
        fx.graph.get_friendship_status(bob, alice).await.unwrap(),
        FriendshipStatus::RequestReceived
    );
    fx.graph.accept_friend_request(bob, alice).await.unwrap();
    assert_eq!(
        fx.graph.get_friendship_status(bob, alice).await.unwrap(),
        FriendshipStatus::Friends
    );
}

#[tokio::test]
async fn suggestions_exclude_self_friends_and_requests() {
    let fx = Fixture::new();
    let me = fx.seed_user("Me").await;
    let friend = fx.seed_user("Friend").await;
    let asked = fx.seed_user("Asked").await;
    let asking = fx.seed_user("Asking").await;
    let stranger = fx.seed_user("Stranger").await;

    fx.graph.send_friend_request(me, friend).await.unwrap();
    fx.graph.accept_friend_request(friend, me).await.unwrap();
    fx.graph.send_friend_request(me, asked).await.unwrap();
    fx.graph.send_friend_request(asking, me).await.unwrap();

    let suggestions = fx.graph.get_friend_suggestions(me, 10).await.unwrap();
    assert_eq!(
        suggestions.iter().map(|u| u.uid).collect::<Vec<_>>(),
        vec![stranger]
    );
}

#[tokio::test]
async fn suggestions_respect_limit() {
    let fx = Fixture::new();
    let me = fx.seed_user("Me").await;
    for i in 0..5 {
        fx.seed_user(&format!("User{i}")).await;
    }

    assert_eq!(fx.graph.get_friend_suggestions(me, 3).await.unwrap().len(), 3);
    assert!(fx.graph.get_friend_suggestions(me, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_accept_keeps_the_writes_that_landed() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;
    fx.graph.send_friend_request(alice, bob).await.unwrap();

    // request update and the first edge land, the second edge is rejected
    fx.store.fail_after_writes(2);
    let result = fx.graph.accept_friend_request(bob, alice).await;
    assert!(matches!(result, Err(ServiceError::RemoteUnavailable(_))));
    fx.store.clear_faults();

    assert_eq!(fx.store.document_count(FRIENDS), 1);
    assert!(fx.user(alice).await.friends.is_empty());
    assert!(fx.user(bob).await.friends.is_empty());

    let request = fx
        .store
        .get_document(FRIEND_REQUESTS, &FriendRequest::doc_id(alice, bob))
        .await
        .unwrap();
    assert_eq!(request.get("status"), Some(&serde_json::json!("accepted")));
}

#[tokio::test]
async fn friends_list_skips_missing_records() {
    let fx = Fixture::new();
    let alice = fx.seed_user("Alice").await;
    let bob = fx.seed_user("Bob").await;
    let carol = fx.seed_user("Carol").await;

    for other in [bob, carol] {
        fx.graph.send_friend_request(alice, other).await.unwrap();
        fx.graph.accept_friend_request(other, alice).await.unwrap();
    }
    fx.store
        .delete_document(USERS, &carol.to_string())
        .await
        .unwrap();

    let friends = fx.graph.get_friends_list(alice).await.unwrap();
    assert_eq!(friends.iter().map(|u| u.uid).collect::<Vec<_>>(), vec![bob]);
}
