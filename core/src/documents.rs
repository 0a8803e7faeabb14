//! Invoices, receipts and other fiscal documents (`/documents`).
//!
//! Amounts and most numeric identifiers travel as strings, as the API
//! expects them.

use serde::{Deserialize, Serialize};

use crate::client::VendusClient;
use crate::clients::YesNo;
use crate::error::ApiError;
use crate::request::RequestSpec;
use crate::transport::Transport;

/// Fiscal document kind.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// Invoice.
    FT,
    /// Simplified invoice.
    FS,
    /// Invoice-receipt.
    FR,
    /// Credit note.
    NC,
    /// Table check.
    DC,
    /// Pro-forma invoice.
    PF,
    /// Quote.
    OT,
    /// Order.
    EC,
    /// Own-assets transport guide.
    GA,
    /// Transport guide.
    GT,
    /// Delivery note.
    GR,
    /// Return note.
    GD,
    /// Receipt.
    RG,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMode {
    Normal,
    Tests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    In,
    None,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Html,
    Escpos,
    Tpasibs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// Product.
    P,
    /// Service.
    S,
    /// Other (shipping, advances).
    O,
    /// Tax or levy other than VAT and stamp duty.
    I,
    /// Special consumption tax.
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockType {
    /// Goods.
    M,
    /// Raw materials and consumables.
    P,
    /// Finished or intermediate products.
    A,
    /// By-products and waste.
    S,
    /// Work in progress.
    T,
}

/// VAT rate bracket.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxId {
    NOR,
    INT,
    RED,
    ISE,
    OUT,
}

/// VAT exemption reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxExemption {
    M01,
    M02,
    M03,
    M04,
    M05,
    M06,
    M07,
    M08,
    M09,
    M10,
    M11,
    M12,
    M13,
    M14,
    M15,
    M16,
    M19,
    M20,
    M21,
    M25,
    M26,
    M30,
    M31,
    M32,
    M33,
    M34,
    M40,
    M41,
    M42,
    M43,
    M99,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u64,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_due: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multibanco {
    pub entity: String,
    pub reference: String,
    pub amount: String,
}

/// Customer data embedded in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub fiscal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postalcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irs_retention: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postalcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
}

/// Custom tax applied to an item instead of a standard rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCustom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub rate: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub document_number: String,
    pub document_row: String,
    pub reference_id: String,
    pub reference_relation: String,
}

/// A document line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_price: Option<String>,
    pub qty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<ItemType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_type: Option<StockType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_exemption: Option<TaxExemption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_exemption_law: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_custom: Option<TaxCustom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_document: Option<ReferenceDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadpoint {
    pub date: String,
    pub time: String,
    pub address: String,
    pub postalcode: String,
    pub city: String,
    pub country: String,
    pub store_id: String,
    pub changestock: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landpoint {
    pub is_global: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub postalcode: String,
    pub city: String,
    pub country: String,
    pub store_id: String,
    pub receivestock: String,
}

/// Transport details for guides (GT, GR, GA, GD).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementOfGoods {
    pub vehicle_id: String,
    pub show_prices: String,
    pub loadpoint: Loadpoint,
    pub landpoint: Landpoint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invoices: Vec<Document>,
}

/// A document to be issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub kind: DocumentType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DocumentMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_supply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncr_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_operation: Option<StockOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifthenpay: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eupago: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multibanco: Option<Multibanco>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<DocumentClient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Supplier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement_of_goods: Option<MovementOfGoods>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_discount: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_template_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors_full: Option<YesNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_room: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_table: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_retention_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irc_retention_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_document_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_qrcode: Option<u64>,
}

impl Document {
    /// A document of `kind` with no lines; fill the rest with struct update
    /// syntax or field assignment.
    pub fn new(kind: DocumentType) -> Self {
        Self {
            kind,
            items: Vec::new(),
            payments: Vec::new(),
            register_id: None,
            discount_code: None,
            discount_amount: None,
            discount_percentage: None,
            date_due: None,
            mode: None,
            date: None,
            date_supply: None,
            notes: None,
            ncr_id: None,
            external_reference: None,
            stock_operation: None,
            ifthenpay: None,
            eupago: None,
            multibanco: None,
            client: None,
            supplier: None,
            movement_of_goods: None,
            print_discount: None,
            output: None,
            output_template_id: None,
            tx_id: None,
            errors_full: None,
            rest_room: None,
            rest_table: None,
            occupation: None,
            stamp_retention_amount: None,
            irc_retention_id: None,
            related_document_id: None,
            return_qrcode: None,
        }
    }
}

/// The issued document as confirmed by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentResponse {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<DocumentType>,
    pub subtype: Option<String>,
    pub tax_authority_id: Option<String>,
    pub number: Option<String>,
    pub date: Option<String>,
    pub date_supply: Option<String>,
    pub system_time: Option<String>,
    pub local_time: Option<String>,
    pub amount_gross: Option<String>,
    pub amount_net: Option<String>,
    pub hash: Option<String>,
    pub atcud: Option<String>,
    /// Rendered document, encoded per the requested `output`.
    pub output: Option<String>,
    pub qrcode: Option<String>,
    pub qrcode_data: Option<String>,
}

/// `/documents` operations, borrowed from a [`VendusClient`].
pub struct DocumentsApi<'a, T: Transport> {
    client: &'a VendusClient<T>,
}

impl<'a, T: Transport> DocumentsApi<'a, T> {
    pub(crate) fn new(client: &'a VendusClient<T>) -> Self {
        Self { client }
    }

    /// Issues a document.
    pub fn create(&self, document: &Document) -> Result<DocumentResponse, ApiError> {
        self.client
            .request(RequestSpec::post("documents").json(document)?)
    }
}
