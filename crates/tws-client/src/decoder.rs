//! Incoming message → callback.
//!
//! Field layouts of legacy messages depend on the negotiated version in the
//! same way outgoing requests do; each handler reads its fields in order
//! and skips the ones the version does not carry. Ids without a handler are
//! logged and dropped.

use std::sync::Arc;

use tracing::debug;

use tws_core::messages::incoming;
use tws_core::server_versions as sv;
use tws_core::{Contract, Execution, OrderStatus, TickAttrib, Wrapper};
use tws_protocol::field_codec::FieldReader;
use tws_protocol::{proto, FrameCodec, ProtocolError};

type Result<T> = std::result::Result<T, ProtocolError>;

pub struct Decoder {
    wrapper: Arc<dyn Wrapper>,
    server_version: i32,
}

impl Decoder {
    pub fn new(wrapper: Arc<dyn Wrapper>, server_version: i32) -> Self {
        Self {
            wrapper,
            server_version,
        }
    }

    /// Legacy path: `fields` excludes the message id.
    pub fn interpret(&self, message_id: i32, fields: &[String]) -> Result<()> {
        let mut r = FieldReader::new(fields);
        match message_id {
            incoming::TICK_PRICE => self.tick_price(&mut r),
            incoming::TICK_SIZE => self.tick_size(&mut r),
            incoming::ORDER_STATUS => self.order_status(&mut r),
            incoming::ERR_MSG => self.error_message(&mut r),
            incoming::NEXT_VALID_ID => {
                r.skip()?;
                self.wrapper.next_valid_id(r.read_int()?);
                Ok(())
            }
            incoming::EXECUTION_DATA => self.execution_data(&mut r),
            incoming::MANAGED_ACCTS => {
                r.skip()?;
                self.wrapper.managed_accounts(&r.read_str()?);
                Ok(())
            }
            incoming::TICK_GENERIC => {
                r.skip()?;
                let (ticker_id, field) = (r.read_int()?, r.read_int()?);
                self.wrapper.tick_generic(ticker_id, field, r.read_double()?);
                Ok(())
            }
            incoming::TICK_STRING => {
                r.skip()?;
                let (ticker_id, field) = (r.read_int()?, r.read_int()?);
                self.wrapper.tick_string(ticker_id, field, &r.read_str()?);
                Ok(())
            }
            incoming::CURRENT_TIME => {
                r.skip()?;
                self.wrapper.current_time(r.read_long()?);
                Ok(())
            }
            incoming::CURRENT_TIME_IN_MILLIS => {
                self.wrapper.current_time_in_millis(r.read_long()?);
                Ok(())
            }
            incoming::EXECUTION_DATA_END => {
                r.skip()?;
                self.wrapper.exec_details_end(r.read_int()?);
                Ok(())
            }
            incoming::TICK_SNAPSHOT_END => {
                r.skip()?;
                self.wrapper.tick_snapshot_end(r.read_int()?);
                Ok(())
            }
            incoming::MARKET_DATA_TYPE => {
                r.skip()?;
                let req_id = r.read_int()?;
                self.wrapper.market_data_type(req_id, r.read_int()?);
                Ok(())
            }
            incoming::ACCOUNT_SUMMARY => {
                r.skip()?;
                let req_id = r.read_int()?;
                let account = r.read_str()?;
                let tag = r.read_str()?;
                let value = r.read_str()?;
                let currency = r.read_str()?;
                self.wrapper
                    .account_summary(req_id, &account, &tag, &value, &currency);
                Ok(())
            }
            incoming::ACCOUNT_SUMMARY_END => {
                r.skip()?;
                self.wrapper.account_summary_end(r.read_int()?);
                Ok(())
            }
            other => {
                debug!("No handler for message id {} ({} fields)", other, fields.len());
                Ok(())
            }
        }
    }

    /// Protobuf path: `message_id` already has the offset removed.
    pub fn process_protobuf(&self, message_id: i32, body: &[u8]) -> Result<()> {
        match message_id {
            incoming::ERR_MSG => {
                let m: proto::ErrorMessage = FrameCodec::decode_protobuf(body)?;
                self.wrapper.error(
                    m.id.unwrap_or(tws_core::NO_VALID_ID),
                    m.error_time.unwrap_or_default(),
                    m.error_code.unwrap_or_default(),
                    m.error_msg.as_deref().unwrap_or_default(),
                    m.advanced_order_reject_json.as_deref().unwrap_or_default(),
                );
            }
            incoming::ORDER_STATUS => {
                let m: proto::OrderStatus = FrameCodec::decode_protobuf(body)?;
                self.wrapper.order_status(&OrderStatus::from(&m));
            }
            incoming::EXECUTION_DATA => {
                let m: proto::ExecutionDetails = FrameCodec::decode_protobuf(body)?;
                let contract = m.contract.as_ref().map(Contract::from).unwrap_or_default();
                let execution = m.execution.as_ref().map(Execution::from).unwrap_or_default();
                self.wrapper
                    .exec_details(m.req_id.unwrap_or(tws_core::NO_VALID_ID), &contract, &execution);
            }
            incoming::EXECUTION_DATA_END => {
                let m: proto::ExecutionDetailsEnd = FrameCodec::decode_protobuf(body)?;
                self.wrapper
                    .exec_details_end(m.req_id.unwrap_or(tws_core::NO_VALID_ID));
            }
            other => {
                debug!("No protobuf handler for message id {} ({} bytes)", other, body.len());
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Legacy handlers
    // ------------------------------------------------------------------

    fn tick_price(&self, r: &mut FieldReader<'_>) -> Result<()> {
        let version = r.read_int()?;
        let ticker_id = r.read_int()?;
        let field = r.read_int()?;
        let price = r.read_double()?;
        let size = if version >= 2 { Some(r.read_double()?) } else { None };
        let attrib = if version >= 3 {
            TickAttrib::from_mask(r.read_int()?)
        } else {
            TickAttrib::default()
        };

        self.wrapper.tick_price(ticker_id, field, price, attrib);

        // Price ticks that carry a size also report it as the paired size tick.
        if let (Some(size), Some(size_field)) = (size, paired_size_tick(field)) {
            self.wrapper.tick_size(ticker_id, size_field, size);
        }
        Ok(())
    }

    fn tick_size(&self, r: &mut FieldReader<'_>) -> Result<()> {
        r.skip()?;
        let ticker_id = r.read_int()?;
        let field = r.read_int()?;
        self.wrapper.tick_size(ticker_id, field, r.read_double()?);
        Ok(())
    }

    fn order_status(&self, r: &mut FieldReader<'_>) -> Result<()> {
        if self.server_version < sv::MARKET_CAP_PRICE {
            r.skip()?;
        }

        let status = OrderStatus {
            order_id: r.read_int()?,
            status: r.read_str()?,
            filled: r.read_double()?,
            remaining: r.read_double()?,
            avg_fill_price: r.read_double()?,
            perm_id: r.read_long()?,
            parent_id: r.read_int()?,
            last_fill_price: r.read_double()?,
            client_id: r.read_int()?,
            why_held: r.read_str()?,
            mkt_cap_price: if sv::supports(self.server_version, sv::MARKET_CAP_PRICE) {
                r.read_double()?
            } else {
                0.0
            },
        };

        self.wrapper.order_status(&status);
        Ok(())
    }

    fn error_message(&self, r: &mut FieldReader<'_>) -> Result<()> {
        if self.server_version < sv::ERROR_TIME {
            r.skip()?;
        }

        let id = r.read_int()?;
        let code = r.read_int()?;
        let message = r.read_str()?;
        let advanced = if sv::supports(self.server_version, sv::ADVANCED_ORDER_REJECT) {
            r.read_str()?
        } else {
            String::new()
        };
        let error_time = if sv::supports(self.server_version, sv::ERROR_TIME) {
            r.read_long()?
        } else {
            0
        };

        self.wrapper.error(id, error_time, code, &message, &advanced);
        Ok(())
    }

    fn execution_data(&self, r: &mut FieldReader<'_>) -> Result<()> {
        let version = if self.server_version < sv::LAST_LIQUIDITY {
            r.read_int()?
        } else {
            self.server_version
        };

        let req_id = if version >= 7 { r.read_int()? } else { tws_core::NO_VALID_ID };
        let order_id = r.read_int()?;

        let mut contract = Contract::default();
        if version >= 5 {
            contract.con_id = r.read_int()?;
        }
        contract.symbol = r.read_str()?;
        contract.sec_type = r.read_str()?;
        contract.last_trade_date_or_contract_month = r.read_str()?;
        contract.strike = r.read_double()?;
        contract.right = r.read_str()?;
        if version >= 9 {
            contract.multiplier = r.read_str()?;
        }
        contract.exchange = r.read_str()?;
        contract.currency = r.read_str()?;
        contract.local_symbol = r.read_str()?;
        if version >= 10 {
            contract.trading_class = r.read_str()?;
        }

        let mut exec = Execution {
            order_id,
            exec_id: r.read_str()?,
            time: r.read_str()?,
            acct_number: r.read_str()?,
            exchange: r.read_str()?,
            side: r.read_str()?,
            shares: r.read_double()?,
            price: r.read_double()?,
            ..Execution::default()
        };
        if version >= 2 {
            exec.perm_id = r.read_long()?;
        }
        if version >= 3 {
            exec.client_id = r.read_int()?;
        }
        if version >= 4 {
            exec.liquidation = r.read_int()?;
        }
        if version >= 6 {
            exec.cum_qty = r.read_double()?;
            exec.avg_price = r.read_double()?;
        }
        if version >= 8 {
            exec.order_ref = r.read_str()?;
        }
        if version >= 9 {
            // ev rule, ev multiplier
            r.skip()?;
            r.skip()?;
        }
        if sv::supports(self.server_version, sv::MODELS_SUPPORT) {
            exec.model_code = r.read_str()?;
        }
        if sv::supports(self.server_version, sv::LAST_LIQUIDITY) {
            exec.last_liquidity = r.read_int()?;
        }
        if sv::supports(self.server_version, sv::PENDING_PRICE_REVISION) {
            r.skip()?;
        }
        if sv::supports(self.server_version, sv::SUBMITTER) {
            r.skip()?;
        }

        self.wrapper.exec_details(req_id, &contract, &exec);
        Ok(())
    }
}

/// Size tick reported alongside a price tick (bid → bid size, ...).
fn paired_size_tick(price_field: i32) -> Option<i32> {
    match price_field {
        1 => Some(0),   // bid
        2 => Some(3),   // ask
        4 => Some(5),   // last
        66 => Some(69), // delayed bid
        67 => Some(70), // delayed ask
        68 => Some(71), // delayed last
        _ => None,
    }
}
