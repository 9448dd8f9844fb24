use crate::application_port::{ServiceError, SocialGraphService};
use crate::domain_model::*;
use crate::domain_port::collections::{
    FRIEND_REQUESTS, FRIENDS, USERS, from_document, to_document, to_value,
};
use crate::domain_port::{DocumentStore, FieldChange, Filter, OrderBy, Query, StoreError};
use std::sync::Arc;

pub struct RealSocialGraphService {
    store: Arc<dyn DocumentStore>,
}

impl RealSocialGraphService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn load_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        let doc = self
            .store
            .get_document(USERS, &user_id.to_string())
            .await?;
        Ok(from_document(doc)?)
    }

    async fn find_request(
        &self,
        sender: UserId,
        receiver: UserId,
    ) -> Result<Option<FriendRequest>, ServiceError> {
        match self
            .store
            .get_document(FRIEND_REQUESTS, &FriendRequest::doc_id(sender, receiver))
            .await
        {
            Ok(doc) => Ok(Some(from_document(doc)?)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn pending_request(
        &self,
        sender: UserId,
        receiver: UserId,
    ) -> Result<FriendRequest, ServiceError> {
        let request = self
            .find_request(sender, receiver)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("friend request {sender} -> {receiver}")))?;
        if !request.is_pending() {
            return Err(ServiceError::InvalidOperation(
                "friend request already accepted".to_owned(),
            ));
        }
        Ok(request)
    }

    async fn update_user(
        &self,
        user_id: UserId,
        changes: Vec<(&str, FieldChange)>,
    ) -> Result<(), ServiceError> {
        let changes = changes
            .into_iter()
            .map(|(field, change)| (field.to_owned(), change))
            .collect();
        self.store
            .update_document(USERS, &user_id.to_string(), changes)
            .await?;
        Ok(())
    }

    async fn delete_accepted_request(
        &self,
        sender: UserId,
        receiver: UserId,
    ) -> Result<(), ServiceError> {
        match self.find_request(sender, receiver).await? {
            Some(request) if !request.is_pending() => {
                self.store
                    .delete_document(FRIEND_REQUESTS, &FriendRequest::doc_id(sender, receiver))
                    .await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn write_friendship(&self, owner: UserId, friend: UserId) -> Result<(), ServiceError> {
        let edge = Friendship {
            owner_id: owner,
            friend_id: friend,
            created_at: self.store.server_timestamp(),
        };
        self.store
            .set_document(FRIENDS, &Friendship::doc_id(owner, friend), to_document(&edge)?)
            .await?;
        Ok(())
    }
}

fn union(id: UserId) -> Result<FieldChange, ServiceError> {
    Ok(FieldChange::ArrayUnion(vec![to_value(&id)?]))
}

fn remove(id: UserId) -> Result<FieldChange, ServiceError> {
    Ok(FieldChange::ArrayRemove(vec![to_value(&id)?]))
}

#[async_trait::async_trait]
impl SocialGraphService for RealSocialGraphService {
    async fn send_friend_request(
        &self,
        sender: UserId,
        receiver: UserId,
    ) -> Result<(), ServiceError> {
        if sender == receiver {
            return Err(ServiceError::InvalidOperation(
                "cannot send friend request to yourself".to_owned(),
            ));
        }
        if self.find_request(sender, receiver).await?.is_some() {
            return Err(ServiceError::DuplicateRequest);
        }

        let sender_record = self.load_user(sender).await?;
        // receiver must exist before anything is written
        self.load_user(receiver).await?;
        if sender_record.friends.contains(&receiver) {
            return Err(ServiceError::InvalidOperation("already friends".to_owned()));
        }
        if sender_record.pending_requests.contains(&receiver) {
            return Err(ServiceError::InvalidOperation(
                "this user already sent you a friend request".to_owned(),
            ));
        }

        let request = FriendRequest {
            sender_id: sender,
            receiver_id: receiver,
            status: RequestStatus::Pending,
            created_at: self.store.server_timestamp(),
            accepted_at: None,
        };
        self.store
            .set_document(
                FRIEND_REQUESTS,
                &FriendRequest::doc_id(sender, receiver),
                to_document(&request)?,
            )
            .await?;
        self.update_user(sender, vec![("sentRequests", union(receiver)?)])
            .await?;
        self.update_user(receiver, vec![("pendingRequests", union(sender)?)])
            .await?;

        tracing::info!(%sender, %receiver, "friend request sent");
        Ok(())
    }

    async fn accept_friend_request(
        &self,
        accepter: UserId,
        sender: UserId,
    ) -> Result<(), ServiceError> {
        self.pending_request(sender, accepter).await?;

        // order: request -> edges -> user sets; each write lands on its own
        let accepted_at = to_value(&self.store.server_timestamp().timestamp_micros())?;
        self.store
            .update_document(
                FRIEND_REQUESTS,
                &FriendRequest::doc_id(sender, accepter),
                vec![
                    ("status".to_owned(), FieldChange::Set(to_value(&RequestStatus::Accepted)?)),
                    ("acceptedAt".to_owned(), FieldChange::Set(accepted_at)),
                ],
            )
            .await?;
        self.write_friendship(accepter, sender).await?;
        self.write_friendship(sender, accepter).await?;
        self.update_user(
            accepter,
            vec![("friends", union(sender)?), ("pendingRequests", remove(sender)?)],
        )
        .await?;
        self.update_user(
            sender,
            vec![("friends", union(accepter)?), ("sentRequests", remove(accepter)?)],
        )
        .await?;

        tracing::info!(%accepter, %sender, "friend request accepted");
        Ok(())
    }

    async fn reject_friend_request(
        &self,
        rejecter: UserId,
        sender: UserId,
    ) -> Result<(), ServiceError> {
        self.pending_request(sender, rejecter).await?;

        self.store
            .delete_document(FRIEND_REQUESTS, &FriendRequest::doc_id(sender, rejecter))
            .await?;
        self.update_user(rejecter, vec![("pendingRequests", remove(sender)?)])
            .await?;
        self.update_user(sender, vec![("sentRequests", remove(rejecter)?)])
            .await?;

        tracing::info!(%rejecter, %sender, "friend request rejected");
        Ok(())
    }

    async fn remove_friend(&self, user: UserId, friend: UserId) -> Result<(), ServiceError> {
        if user == friend {
            return Err(ServiceError::InvalidOperation(
                "cannot unfriend yourself".to_owned(),
            ));
        }

        let record = self.load_user(user).await?;
        if !record.friends.contains(&friend) {
            return Err(ServiceError::InvalidOperation("not friends".to_owned()));
        }

        self.store
            .delete_document(FRIENDS, &Friendship::doc_id(user, friend))
            .await?;
        self.store
            .delete_document(FRIENDS, &Friendship::doc_id(friend, user))
            .await?;
        // accepted requests would otherwise block a new request between the pair
        self.delete_accepted_request(user, friend).await?;
        self.delete_accepted_request(friend, user).await?;
        self.update_user(user, vec![("friends", remove(friend)?)])
            .await?;
        self.update_user(friend, vec![("friends", remove(user)?)])
            .await?;

        tracing::info!(%user, %friend, "friend removed");
        Ok(())
    }

    async fn get_friends_list(&self, user: UserId) -> Result<Vec<User>, ServiceError> {
        let record = self.load_user(user).await?;

        let mut friends = Vec::with_capacity(record.friends.len());
        for friend_id in record.friends {
            match self.load_user(friend_id).await {
                Ok(friend) => friends.push(friend),
                Err(e) => tracing::warn!(%friend_id, "skipping friend: {e}"),
            }
        }
        Ok(friends)
    }

    async fn get_pending_requests(
        &self,
        user: UserId,
    ) -> Result<Vec<PendingRequest>, ServiceError> {
        let query = Query::new()
            .filter(Filter::eq("receiverId", to_value(&user)?))
            .filter(Filter::eq("status", to_value(&RequestStatus::Pending)?))
            .order_by(OrderBy::asc("createdAt"));
        let docs = self.store.query_documents(FRIEND_REQUESTS, &query).await?;

        let mut pending = Vec::with_capacity(docs.len());
        for doc in docs {
            let request: FriendRequest = from_document(doc)?;
            match self.load_user(request.sender_id).await {
                Ok(sender) => pending.push(PendingRequest { request, sender }),
                Err(e) => tracing::warn!(sender = %request.sender_id, "skipping request: {e}"),
            }
        }
        Ok(pending)
    }

    async fn get_friend_suggestions(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<User>, ServiceError> {
        let record = self.load_user(user).await?;
        let docs = self
            .store
            .query_documents(USERS, &Query::new().order_by(OrderBy::asc("uid")))
            .await?;

        let mut suggestions = Vec::new();
        for doc in docs {
            if suggestions.len() >= limit {
                break;
            }
            let candidate: User = match from_document(doc) {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::warn!("skipping malformed user: {e}");
                    continue;
                }
            };
            if candidate.uid != user && !record.is_related_to(&candidate.uid) {
                suggestions.push(candidate);
            }
        }
        Ok(suggestions)
    }

    async fn get_friendship_status(
        &self,
        user: UserId,
        other: UserId,
    ) -> Result<FriendshipStatus, ServiceError> {
        let record = self.load_user(user).await?;
        Ok(FriendshipStatus::between(&record, &other))
    }
}
