use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(pub String);

/// Reference to an order aggregate owned by the external order store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRef(pub String);

/// Composite identity of one conversation; the unit of isolation for both
/// the session lifecycle and the recommendation funnel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub customer_id: CustomerId,
    pub branch_id: BranchId,
}

impl ConversationKey {
    pub fn new(customer_id: impl Into<String>, branch_id: impl Into<String>) -> Self {
        Self {
            customer_id: CustomerId(customer_id.into()),
            branch_id: BranchId(branch_id.into()),
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.customer_id.0, self.branch_id.0)
    }
}
