use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 一条订单记录，推送格式与后台原有字段名保持一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// 店铺名称
    pub shop_name: String,
    /// 订单号
    pub id: String,
    /// 下单时间
    pub created_time: String,
    /// 付款时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_time: Option<String>,
    /// 物流编号
    pub logistics_id: String,
    /// 物流名称
    pub logistics_name: String,
    pub customer: Customer,
    /// 商品总额
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// 运费金额
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freight_amount: Option<Decimal>,
    /// 促销价格
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_price: Option<Decimal>,
    /// 优惠券
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Decimal>,
    /// 京豆
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bean: Option<Decimal>,
    /// 应支付金额
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Decimal>,
    /// sku 列表
    pub items: Vec<SkuItem>,
}

impl OrderRecord {
    pub fn new(shop_name: impl Into<String>) -> Self {
        Self {
            shop_name: shop_name.into(),
            ..Default::default()
        }
    }

    /// 是否有任何金额字段被写入
    pub fn has_financials(&self) -> bool {
        [
            self.amount,
            self.freight_amount,
            self.promotion_price,
            self.coupon,
            self.bean,
            self.paid_amount,
        ]
        .iter()
        .any(Option::is_some)
            || self.paid_time.is_some()
    }
}

/// 收货人信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// 收货人姓名
    pub name: String,
    /// 收货人电话
    pub mobile: String,
    /// 东东号
    pub dongdong: String,
}

/// 订单中的一个货品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuItem {
    /// 货品代码
    pub id: String,
    /// 货品名称
    pub name: String,
    pub price: Decimal,
    /// 折扣
    #[serde(rename = "disaccount")]
    pub discount: Decimal,
    /// 数量
    pub qty: i64,
}
