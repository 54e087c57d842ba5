use serde::{Deserialize, Serialize};

use super::types::{QfxAmount, QfxDate};

#[derive(Debug, Deserialize)]
pub(super) struct QfxBankMsgsRsV1 {
    #[serde(rename = "STMTTRNRS", default)]
    pub(super) statements: Vec<QfxStmtTrnRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCreditCardMsgsRsV1 {
    #[serde(rename = "CCSTMTTRNRS", default)]
    pub(super) statements: Vec<QfxCcStmtTrnRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxStmtTrnRs {
    #[serde(rename = "STMTRS", default)]
    pub(super) stmt_rs: Option<QfxStmtRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCcStmtTrnRs {
    #[serde(rename = "CCSTMTRS", default)]
    pub(super) cc_stmt_rs: Option<QfxCcStmtRs>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxAccountFrom {
    #[serde(rename = "ACCTID", default)]
    pub(super) account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxStmtRs {
    #[serde(rename = "BANKACCTFROM", default)]
    pub(super) account: Option<QfxAccountFrom>,
    #[serde(rename = "BANKTRANLIST", default)]
    pub(super) bank_transaction_list: Option<QfxBankTransactionList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxCcStmtRs {
    #[serde(rename = "CCACCTFROM", default)]
    pub(super) account: Option<QfxAccountFrom>,
    #[serde(rename = "BANKTRANLIST", default)]
    pub(super) bank_transaction_list: Option<QfxBankTransactionList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QfxBankTransactionList {
    #[serde(rename = "STMTTRN", default)]
    pub(super) transactions: Vec<QfxTransactionRaw>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OfxXml {
    #[serde(rename = "BANKMSGSRSV1")]
    pub(super) bank_msgs: Option<QfxBankMsgsRsV1>,
    #[serde(rename = "CREDITCARDMSGSRSV1")]
    pub(super) cc_msgs: Option<QfxCreditCardMsgsRsV1>,
}

/// Every field is optional here; a missing date or amount rejects only
/// that transaction, not the file.
#[derive(Debug, Deserialize)]
pub(super) struct QfxTransactionRaw {
    #[serde(rename = "TRNTYPE", default)]
    trn_type: Option<String>,
    #[serde(rename = "DTPOSTED", default)]
    dt_posted: Option<QfxDate>,
    #[serde(rename = "TRNAMT", default)]
    amount: Option<QfxAmount>,
    #[serde(rename = "FITID", default)]
    fitid: Option<String>,
    #[serde(rename = "NAME", default)]
    name: Option<String>,
    #[serde(rename = "MEMO", default)]
    memo: Option<String>,
}

/// One `STMTTRN` together with the account of the statement it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QfxTransaction {
    #[serde(rename = "ACCTID")]
    pub account_id: Option<String>,
    #[serde(rename = "TRNTYPE")]
    pub trn_type: Option<String>,
    #[serde(rename = "DTPOSTED")]
    pub dt_posted: Option<QfxDate>,
    #[serde(rename = "TRNAMT")]
    pub amount: Option<QfxAmount>,
    #[serde(rename = "FITID")]
    pub fitid: Option<String>,
    #[serde(rename = "NAME")]
    pub name: Option<String>,
    #[serde(rename = "MEMO")]
    pub memo: Option<String>,
}

impl QfxTransaction {
    pub(super) fn from_raw(raw: QfxTransactionRaw, account_id: Option<&str>) -> Self {
        QfxTransaction {
            account_id: non_blank(account_id.map(str::to_string)),
            trn_type: non_blank(raw.trn_type),
            dt_posted: raw.dt_posted,
            amount: raw.amount,
            fitid: non_blank(raw.fitid),
            name: non_blank(raw.name),
            memo: non_blank(raw.memo),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl QfxStmtRs {
    pub(super) fn into_transactions(self) -> Vec<QfxTransaction> {
        collect(self.account, self.bank_transaction_list)
    }
}

impl QfxCcStmtRs {
    pub(super) fn into_transactions(self) -> Vec<QfxTransaction> {
        collect(self.account, self.bank_transaction_list)
    }
}

fn collect(
    account: Option<QfxAccountFrom>,
    list: Option<QfxBankTransactionList>,
) -> Vec<QfxTransaction> {
    let account_id = account.and_then(|a| a.account_id);
    list.map(|l| l.transactions)
        .unwrap_or_default()
        .into_iter()
        .map(|raw| QfxTransaction::from_raw(raw, account_id.as_deref()))
        .collect()
}
