use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::models::{Card, CardPatch, NewCard};
use crate::database::store::{Store, StoreTx};
use crate::services::error::ServiceError;
use crate::services::ordering::{append_order, plan_placement, Placement};
use crate::services::ownership::{authorize_card, authorize_list, authorize_list_for_card_target};
use crate::types::{CardQuery, MessageResponse, SortDirection};

/// Tries before a move racing other moves of the same card gives up
const MOVE_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CardService {
    store: Arc<dyn Store>,
}

impl CardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Appends a card to the end of a list owned by `user_id`
    pub async fn create(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        company_name: &str,
        role_name: &str,
    ) -> Result<Card, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_list(&mut *tx, list_id, user_id).await?;
        tx.lock_list(list_id).await?;

        let order = append_order(max_card_order(&mut *tx, list_id).await?);
        let card = tx
            .create_card(&NewCard {
                company_name: company_name.to_string(),
                role_name: role_name.to_string(),
                list_id,
                user_id,
                order,
            })
            .await?;
        tx.commit().await?;

        info!("Created card {} in list {} at order {}", card.id, list_id, order);
        Ok(card)
    }

    pub async fn update(&self, card_id: Uuid, user_id: Uuid, patch: CardPatch) -> Result<Card, ServiceError> {
        // placement goes through move_card only
        let patch = CardPatch {
            list_id: None,
            order: None,
            ..patch
        };

        let mut tx = self.store.begin().await?;
        authorize_card(&mut *tx, card_id, user_id).await?;
        let card = tx.update_card(card_id, &patch).await?;
        tx.commit().await?;
        Ok(card)
    }

    pub async fn remove(&self, card_id: Uuid, user_id: Uuid) -> Result<MessageResponse, ServiceError> {
        let mut tx = self.store.begin().await?;
        authorize_card(&mut *tx, card_id, user_id).await?;
        tx.delete_card(card_id).await?;
        tx.commit().await?;

        info!("Deleted card {}", card_id);
        Ok(MessageResponse::new("Card deleted successfully."))
    }

    /// Move a card to position `target_index` of `new_list_id`.
    ///
    /// Only the moving card is written, unless its neighbours are too close
    /// to split, in which case the destination list is renumbered. All reads
    /// and writes share one transaction holding the source and destination
    /// list locks and the card's row lock.
    pub async fn move_card(
        &self,
        card_id: Uuid,
        user_id: Uuid,
        new_list_id: Uuid,
        target_index: usize,
    ) -> Result<Card, ServiceError> {
        for attempt in 1..=MOVE_ATTEMPTS {
            match self.try_move(card_id, user_id, new_list_id, target_index).await? {
                Some(card) => return Ok(card),
                None => debug!("Card {} changed lists before it was locked (attempt {})", card_id, attempt),
            }
        }
        warn!("Giving up moving card {} after {} attempts", card_id, MOVE_ATTEMPTS);
        Err(ServiceError::Conflict("Card is being moved by another request, please retry.".to_string()))
    }

    /// One locked attempt; `None` means the card left its list between the
    /// ownership read and the lock, so the wrong source list is held.
    async fn try_move(
        &self,
        card_id: Uuid,
        user_id: Uuid,
        new_list_id: Uuid,
        target_index: usize,
    ) -> Result<Option<Card>, ServiceError> {
        let mut tx = self.store.begin().await?;
        let seen = authorize_card(&mut *tx, card_id, user_id).await?;
        authorize_list_for_card_target(&mut *tx, new_list_id, user_id).await?;

        let (first, second) = if seen.list_id <= new_list_id {
            (seen.list_id, new_list_id)
        } else {
            (new_list_id, seen.list_id)
        };
        tx.lock_list(first).await?;
        if second != first {
            tx.lock_list(second).await?;
        }

        let card = match tx.lock_card(card_id).await? {
            Some(card) if card.list_id == seen.list_id => card,
            Some(_) => return Ok(None),
            None => return Err(ServiceError::not_found(format!("Card with ID {card_id} not found."))),
        };

        let neighbours: Vec<(Uuid, f64)> = tx
            .find_cards_by_list(new_list_id, &CardQuery::excluding(card.id))
            .await?
            .into_iter()
            .map(|c| (c.id, c.order))
            .collect();
        let current = (card.list_id == new_list_id).then_some(card.order);

        let moved = match plan_placement(&neighbours, card.id, current, target_index) {
            Placement::Unchanged => {
                debug!("Card {} already at index {} of list {}", card.id, target_index, new_list_id);
                card
            }
            Placement::Single(order) => {
                tx.update_card(card.id, &CardPatch::placement(new_list_id, order)).await?
            }
            Placement::Renumber(orders) => {
                info!("Renumbering {} cards of list {}", orders.len(), new_list_id);
                let order = orders
                    .iter()
                    .find(|(id, _)| *id == card.id)
                    .map(|(_, order)| *order)
                    .ok_or_else(|| ServiceError::Internal(format!("Card {} lost during renumbering", card.id)))?;
                let others: Vec<(Uuid, f64)> = orders.into_iter().filter(|(id, _)| *id != card.id).collect();

                let moved = tx.update_card(card.id, &CardPatch::placement(new_list_id, order)).await?;
                let written = tx.renumber_cards(new_list_id, &others).await?;
                if written != others.len() as u64 {
                    warn!("Renumbered {} of {} neighbours in list {}", written, others.len(), new_list_id);
                }
                moved
            }
        };
        tx.commit().await?;

        Ok(Some(moved))
    }
}

async fn max_card_order(tx: &mut dyn StoreTx, list_id: Uuid) -> Result<Option<f64>, ServiceError> {
    let query = CardQuery {
        direction: SortDirection::Desc,
        take: Some(1),
        ..Default::default()
    };
    let last = tx.find_cards_by_list(list_id, &query).await?;
    Ok(last.first().map(|card| card.order))
}
