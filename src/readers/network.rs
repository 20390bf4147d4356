//! Network address scalar readers: inet, cidr, macaddr, macaddr8.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::{insert, RegistryEntry};
use crate::cursor::Cursor;
use crate::error::{ProtocolError, Result};
use crate::oid::{oid, Oid};
use crate::value::{IpNetworkValue, Value};

/// PostgreSQL's own address-family tags on the wire. These are *not* the platform's
/// `AF_INET`/`AF_INET6` constants, which is why libpq clients hardcode them.
const PGSQL_AF_INET: u8 = 2;
const PGSQL_AF_INET6: u8 = 3;

fn inet_like_binary(cur: &mut Cursor<'_>, expected_is_cidr: bool) -> Result<IpNetworkValue> {
    let family = cur.advance_u8()?;
    let prefix_len = cur.advance_u8()?;
    let is_cidr_byte = cur.advance_u8()?;
    let is_cidr = is_cidr_byte != 0;
    if is_cidr != expected_is_cidr {
        return Err(ProtocolError::InvalidIsCidrFlag(is_cidr_byte).into());
    }
    let addr_len = cur.advance_u8()?;
    let address = match family {
        PGSQL_AF_INET => {
            if addr_len != 4 {
                return Err(ProtocolError::InvalidAddressFamily(family).into());
            }
            let bytes = cur.advance_bytes(4)?;
            let octets: [u8; 4] = bytes.try_into().unwrap_or_else(|_| unreachable!());
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        PGSQL_AF_INET6 => {
            if addr_len != 16 {
                return Err(ProtocolError::InvalidAddressFamily(family).into());
            }
            let bytes = cur.advance_bytes(16)?;
            let octets: [u8; 16] = bytes.try_into().unwrap_or_else(|_| unreachable!());
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        other => return Err(ProtocolError::InvalidAddressFamily(other).into()),
    };
    Ok(IpNetworkValue {
        address,
        prefix_len,
        is_cidr,
    })
}

fn inet_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Inet(inet_like_binary(cur, false)?))
}

fn cidr_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    Ok(Value::Cidr(inet_like_binary(cur, true)?))
}

fn macaddr_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let bytes = cur.advance_bytes(6)?;
    let array: [u8; 6] = bytes.try_into().unwrap_or_else(|_| unreachable!());
    Ok(Value::MacAddr(array))
}

fn macaddr8_binary(cur: &mut Cursor<'_>) -> Result<Value> {
    let bytes = cur.advance_bytes(8)?;
    let array: [u8; 8] = bytes.try_into().unwrap_or_else(|_| unreachable!());
    Ok(Value::MacAddr8(array))
}

pub(super) fn register(entries: &mut HashMap<Oid, RegistryEntry>) {
    insert(
        entries,
        oid::INET,
        RegistryEntry {
            text: None,
            binary: Some(inet_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::CIDR,
        RegistryEntry {
            text: None,
            binary: Some(cidr_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::MACADDR,
        RegistryEntry {
            text: None,
            binary: Some(macaddr_binary),
            array_element_oid: None,
        },
    );
    insert(
        entries,
        oid::MACADDR8,
        RegistryEntry {
            text: None,
            binary: Some(macaddr8_binary),
            array_element_oid: None,
        },
    );
}
